use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;

use bakery_rs::lock::BakeryLock;
use bakery_rs::resource::Resource;

#[derive(Debug, Parser)]
#[command(author, version, about = "Run N workers through a bakery lock")]
struct Cli {
    /// Number of workers (1..=256).
    #[arg(value_name = "INT")]
    n: usize,

    /// How long each worker holds the resource, in milliseconds.
    #[clap(long, value_name = "INT", default_value = "1000")]
    hold_ms: u64,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let args = Cli::parse();

    // Rejects n outside 1..=256 before any worker starts.
    let lock = Arc::new(BakeryLock::new(args.n)?);
    let resource = Arc::new(Resource::new());
    let hold = Duration::from_millis(args.hold_ms);

    let handles: Vec<_> = (0..args.n)
        .map(|i| {
            let lock = Arc::clone(&lock);
            let resource = Arc::clone(&resource);
            thread::spawn(move || {
                let _guard = lock.lock(i);
                if let Err(err) = resource.enter(i) {
                    // Exclusion itself failed; nothing is safe to recover.
                    eprintln!("Error: {}", err);
                    std::process::exit(2);
                }
                println!("Thread {} using resource...", i);
                thread::sleep(hold);
                resource.leave(i);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    Ok(())
}
