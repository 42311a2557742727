//! labelsnap
//!
//! Photograph a product label, select the product number region, run text
//! recognition, and record the result with packaging unit, quantity and
//! expiration date into a list that can be exported or served over HTTP.

mod app;
mod capture;
mod config;
mod export;
mod flow;
mod form;
mod ocr;
mod paths;
mod selection;
mod server;
mod store;

use std::fs::OpenOptions;
use std::io::Write;
use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::Local;

use crate::selection::PixelRect;
use crate::store::RecordStore;

/// Logs a message to both console and log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    print!("{}", line);
    let log_path = paths::get_logs_dir().join("labelsnap.log");
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}

fn main() -> Result<()> {
    paths::ensure_directories()?;
    config::init_config();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("run") => app::run(),
        Some("serve") => cmd_serve(args.get(1).map(String::as_str)),
        Some("recognize") => cmd_recognize(&args[1..]),
        Some("export") => cmd_export(args.get(1).map(String::as_str)),
        Some(other) => {
            print_usage();
            Err(anyhow!("Unknown subcommand: {}", other))
        }
    }
}

fn print_usage() {
    println!("Usage: labelsnap [run | serve [addr] | recognize <image> <x> <y> <w> <h> | export [dir]]");
}

fn cmd_serve(addr: Option<&str>) -> Result<()> {
    let config = config::get_config();
    let addr = addr.unwrap_or(&config.listen_addr);

    // The server is the remote backend's other side; serving on top of the
    // remote store would call back into itself.
    let store: Box<dyn RecordStore> = if config.storage_backend == "remote" {
        log("The serve subcommand always uses the local store");
        Box::new(store::LocalStore::open(
            &paths::get_store_dir(),
            config.protect_default_units,
        ))
    } else {
        store::open_backend(config)?
    };

    server::serve(addr, server::shared(store))
}

fn cmd_recognize(args: &[String]) -> Result<()> {
    let [path, x, y, w, h] = args else {
        print_usage();
        return Err(anyhow!("recognize needs <image> <x> <y> <w> <h>"));
    };

    let rect = PixelRect {
        x: x.parse()?,
        y: y.parse()?,
        width: w.parse()?,
        height: h.parse()?,
    };

    let image = capture::acquire_from_file(std::path::Path::new(path))?;
    let config = config::get_config();
    let session = ocr::OcrSession::initialize(
        config.ocr_contrast,
        Duration::from_millis(config.recognition_timeout_ms),
    )?;

    let outcome = session.recognize(&image, &rect, 0)?;
    if outcome.is_accepted() {
        println!("{}", outcome.product_number);
    } else {
        println!("(no product number recognized)");
    }
    session.teardown();
    Ok(())
}

fn cmd_export(dir: Option<&str>) -> Result<()> {
    let config = config::get_config();
    let mut store = store::open_backend(config)?;
    let records = store.inventory()?;

    let dir = dir
        .map(std::path::PathBuf::from)
        .unwrap_or_else(paths::get_exports_dir);
    let path = export::write_csv(&dir, &records)?;
    println!("Exported {} record(s) to {}", records.len(), path.display());
    Ok(())
}
