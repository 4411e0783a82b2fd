use clap::Parser;
use eframe::egui;
use log::{error, info};
use pulmoscan_core::app::ViewerApp;
use pulmoscan_core::cli::Cli;
use pulmoscan_core::layout::default_data_dir;
use pulmoscan_core::{DataLayout, MetaStore, VolumeStore};
use std::process;

fn main() {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose);

    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
    info!("Using data directory: {}", data_dir.display());
    let layout = DataLayout::new(data_dir);

    let volumes = VolumeStore::new(layout);

    // Metadata failures still open the window, showing only the error
    let app = match MetaStore::load(volumes.layout()) {
        Ok(meta) => {
            info!(
                "Loaded {} scan and {} nodule records",
                meta.scan_count(),
                meta.nodule_count()
            );
            ViewerApp::new(meta, volumes, cli.patient.as_deref())
        }
        Err(e) => {
            error!("{}", e);
            ViewerApp::startup_error(e.to_string(), volumes)
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1100.0, 800.0]),
        ..Default::default()
    };
    if let Err(e) = eframe::run_native("pulmoscan", options, Box::new(|_cc| Ok(Box::new(app)))) {
        error!("Viewer exited with error: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}
