use clap::{Parser, ValueEnum};
use image::RgbaImage;
use log::{error, info};
use pulmoscan_core::layout::default_data_dir;
use pulmoscan_core::render::{overlay_nodules, render_slice};
use pulmoscan_core::{
    DataLayout, MetaStore, PatientReport, VolumeStore, Window, DEFAULT_WINDOW,
};
use std::path::{Path, PathBuf};
use std::process;

/// CLI tool for reporting on one patient of a lung CT dataset
#[derive(Parser, Debug)]
#[command(name = "pulmoreport")]
#[command(about = "Print a nodule report and export rendered CT slices without the GUI")]
#[command(version)]
struct Cli {
    /// Patient ID to report on (defaults to the first listed)
    #[arg(value_name = "PATIENT")]
    patient: Option<String>,

    /// Data directory with metadata CSVs and per-patient volume folders
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Write the rendered slice as a PNG to this path
    #[arg(long, value_name = "FILE")]
    save_slice: Option<PathBuf>,

    /// 1-based slice number to export (defaults to the middle slice)
    #[arg(long)]
    slice: Option<usize>,

    /// Window level in Hounsfield units
    #[arg(long, default_value_t = DEFAULT_WINDOW.level)]
    level: i32,

    /// Window width in Hounsfield units
    #[arg(long, default_value_t = DEFAULT_WINDOW.width)]
    width: i32,

    /// Export the bare slice without the nodule overlay
    #[arg(long)]
    no_overlay: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

fn main() {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose);

    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);
    info!("Using data directory: {}", data_dir.display());
    let layout = DataLayout::new(data_dir);

    let meta = match MetaStore::load(&layout) {
        Ok(meta) => meta,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let patient = match &cli.patient {
        Some(requested) => {
            if meta.scan_for(requested).is_none() {
                eprintln!("Error: patient '{}' not found in scan metadata", requested);
                process::exit(1);
            }
            requested.clone()
        }
        None => match meta.patients().first() {
            Some(first) => first.to_string(),
            None => {
                eprintln!("Error: no patients listed in scan metadata");
                process::exit(1);
            }
        },
    };
    info!("Reporting on patient '{}'", patient);

    output_report(&meta, &patient, &cli.format);

    if let Some(path) = cli.save_slice.clone() {
        save_slice(&layout, &cli, &patient, &path);
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

fn output_report(meta: &MetaStore, patient: &str, format: &OutputFormat) {
    let scan = meta.scan_for(patient);
    let nodules = meta.nodules_for(patient);

    match format {
        OutputFormat::Text => {
            let report = PatientReport::new(patient, scan, &nodules);
            println!("{}", report);
        }
        OutputFormat::Json => {
            #[cfg(feature = "json")]
            {
                match report_json(patient, scan, &nodules) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        error!("Failed to serialize to JSON: {}", e);
                        eprintln!("Error: Failed to serialize to JSON: {}", e);
                        process::exit(1);
                    }
                }
            }
            #[cfg(not(feature = "json"))]
            {
                eprintln!("Error: JSON output requires the 'json' feature");
                eprintln!("Rebuild with: cargo build --features json");
                process::exit(1);
            }
        }
    }
}

#[cfg(feature = "json")]
fn report_json(
    patient_id: &str,
    scan: Option<&pulmoscan_core::ScanRecord>,
    nodules: &[&pulmoscan_core::NoduleRecord],
) -> Result<String, serde_json::Error> {
    use serde::Serialize;

    #[derive(Serialize)]
    struct ReportJson {
        patient_id: String,
        diagnosis: Option<String>,
        diagnosis_method: Option<String>,
        nodules: Vec<NoduleJson>,
    }

    #[derive(Serialize)]
    struct NoduleJson {
        nodule_id: u32,
        diameter: f64,
        surface_area: f64,
        volume: f64,
        malignancy: i64,
        malignancy_label: String,
    }

    let output = ReportJson {
        patient_id: patient_id.to_string(),
        diagnosis: scan.map(|s| s.diagnosis.clone()),
        diagnosis_method: scan.map(|s| s.diagnosis_method.clone()),
        nodules: nodules
            .iter()
            .map(|n| NoduleJson {
                nodule_id: n.nodule_id,
                diameter: n.diameter,
                surface_area: n.surface_area,
                volume: n.volume,
                malignancy: n.malignancy,
                malignancy_label: n.rating().label().to_string(),
            })
            .collect(),
    };

    serde_json::to_string_pretty(&output)
}

fn save_slice(layout: &DataLayout, cli: &Cli, patient: &str, path: &Path) {
    let mut volumes = VolumeStore::new(layout.clone());

    let volume = match volumes.ct_volume(patient) {
        Ok(volume) => volume,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let depth = volume.dim().2;
    let slice = cli.slice.unwrap_or_else(|| (depth / 2).max(1));
    if slice == 0 || slice > depth {
        eprintln!("Error: slice must be between 1 and {}", depth);
        process::exit(1);
    }
    let z = slice - 1;
    let window = Window::new(cli.level, cli.width);

    let frame = match render_export(&mut volumes, patient, z, window, !cli.no_overlay) {
        Ok(frame) => frame,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = frame.save(path) {
        error!("Failed to write {}: {}", path.display(), e);
        eprintln!("Error: Failed to write {}: {}", path.display(), e);
        process::exit(1);
    }
    info!(
        "Saved slice {} of patient '{}' ({}) to {}",
        slice,
        patient,
        window,
        path.display()
    );
    println!("Saved {}", path.display());
}

/// Renders the exported frame: windowed slice plus optional overlay
fn render_export(
    volumes: &mut VolumeStore,
    patient: &str,
    z: usize,
    window: Window,
    with_overlay: bool,
) -> pulmoscan_core::Result<RgbaImage> {
    let volume = volumes.ct_volume(patient)?;
    let base = render_slice(&volume, z, window)?;
    if !with_overlay {
        return Ok(base);
    }
    let mask = volumes.mask_volume(patient);
    Ok(overlay_nodules(&base, &mask, z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;
    use ndarray_npy::WriteNpyExt;
    use pulmoscan_core::PulmoError;
    use std::fs::{self, File};
    use tempfile::TempDir;

    /// Writes a small but complete dataset: one patient, one nodule, no masks
    fn dataset_fixture() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("scan_meta.csv"),
            "PatientID,Diagnosis,DiagnosisMethod\nP1,Malignant,Biopsy\n",
        )
        .unwrap();
        fs::write(
            tmp.path().join("nodule_meta.csv"),
            "PatientID,NoduleID,Diameter,SurfaceArea,Volume,Malignancy\n\
             P1,1,12.34,56.78,90.12,4\n",
        )
        .unwrap();

        let patient_dir = tmp.path().join("P1");
        fs::create_dir(&patient_dir).unwrap();
        let mut scan = Array3::from_elem((8, 8, 4), -600.0f32);
        scan[[0, 0, 1]] = -1350.0;
        scan[[0, 1, 1]] = 150.0;
        scan.write_npy(File::create(patient_dir.join("scan.npy")).unwrap())
            .unwrap();
        tmp
    }

    #[test]
    fn test_report_text_end_to_end() {
        let tmp = dataset_fixture();
        let layout = DataLayout::new(tmp.path());
        let meta = MetaStore::load(&layout).unwrap();

        let scan = meta.scan_for("P1");
        let nodules = meta.nodules_for("P1");
        let output = format!("{}", PatientReport::new("P1", scan, &nodules));

        assert!(output.contains("Diagnosis:        Malignant"));
        assert!(output.contains("Diameter:         12.34 mm"));
        assert!(output.contains("Surface Area:     56.78 mm²"));
        assert!(output.contains("Volume:           90.12 mm³"));
        assert!(output.contains("Pred. Malignancy: Moderately Suspicious"));
    }

    #[test]
    fn test_render_export_is_opaque() {
        let tmp = dataset_fixture();
        let mut volumes = VolumeStore::new(DataLayout::new(tmp.path()));

        let frame = render_export(&mut volumes, "P1", 1, DEFAULT_WINDOW, false).unwrap();
        assert_eq!(frame.dimensions(), (8, 8));
        assert!(frame.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn test_render_export_without_masks_matches_bare_slice() {
        // No mask files: the fallback mask is all false, so the overlay
        // must leave every pixel untouched
        let tmp = dataset_fixture();
        let mut volumes = VolumeStore::new(DataLayout::new(tmp.path()));

        let with_overlay = render_export(&mut volumes, "P1", 1, DEFAULT_WINDOW, true).unwrap();
        let without = render_export(&mut volumes, "P1", 1, DEFAULT_WINDOW, false).unwrap();
        assert_eq!(with_overlay, without);
    }

    #[test]
    fn test_render_export_missing_patient_fails() {
        let tmp = dataset_fixture();
        let mut volumes = VolumeStore::new(DataLayout::new(tmp.path()));

        let result = render_export(&mut volumes, "P2", 0, DEFAULT_WINDOW, true);
        assert!(matches!(result, Err(PulmoError::MissingCtVolume(ref p)) if p == "P2"));
    }

    #[test]
    fn test_render_export_bad_slice_fails() {
        let tmp = dataset_fixture();
        let mut volumes = VolumeStore::new(DataLayout::new(tmp.path()));

        let result = render_export(&mut volumes, "P1", 9, DEFAULT_WINDOW, false);
        assert!(matches!(
            result,
            Err(PulmoError::SliceOutOfBounds { index: 9, depth: 4 })
        ));
    }
}
