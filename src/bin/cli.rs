//! icetrack CLI - Batch indexing tool for survey track CSV exports
//!
//! Usage:
//!   icetrack-cli index <folder> --artifact <file> [--catalog <csv>] [--hemisphere <h>]
//!
//! Reads per-granule coordinate CSVs (projected `ps71_easting`/
//! `ps71_northing` columns or geographic `latitude`/`longitude` columns,
//! plus `institution`/`campaign`/`granule` metadata), runs the
//! normalization/filter/simplify chain, indexes the results into an
//! in-memory feature store and writes the styled layer-definition
//! artifact for the visualization tooling.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use icetrack::naming::ConventionRegistry;
use icetrack::{
    build_style_project, build_tracks, write_project, AvailabilityCatalog, AvailabilityStatus,
    FeatureStore, Hemisphere, MemoryStore, PipelineConfig, RawTrack, SourceIdentity, TrackIndexer,
};

#[derive(Parser)]
#[command(name = "icetrack-cli")]
#[command(about = "Index survey track CSV exports into a styled feature store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum HemisphereArg {
    Arctic,
    Antarctic,
}

impl From<HemisphereArg> for Hemisphere {
    fn from(arg: HemisphereArg) -> Self {
        match arg {
            HemisphereArg::Arctic => Hemisphere::Arctic,
            HemisphereArg::Antarctic => Hemisphere::Antarctic,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize, simplify and index a folder of coordinate CSVs
    Index {
        /// Folder containing per-granule CSV files
        folder: PathBuf,

        /// Output path for the style artifact (JSON)
        #[arg(short, long)]
        artifact: Option<PathBuf>,

        /// Optional catalog CSV with `campaign,status` rows overriding the
        /// availability codes found in the data files
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Hemisphere for rows without a `region` column
        #[arg(long, value_enum, default_value = "antarctic")]
        hemisphere: HemisphereArg,

        /// Minimum spacing between retained points, meters
        #[arg(long, default_value = "200")]
        min_spacing: f64,

        /// Simplification tolerance for line tracks, meters
        #[arg(long, default_value = "10")]
        tolerance: f64,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Index {
            folder,
            artifact,
            catalog,
            hemisphere,
            min_spacing,
            tolerance,
        } => {
            run_index(
                &folder,
                artifact.as_deref(),
                catalog.as_deref(),
                hemisphere.into(),
                min_spacing,
                tolerance,
                cli.verbose,
            );
        }
    }
}

/// One CSV file parsed into a raw track plus its availability code.
struct CsvTrack {
    raw: RawTrack,
    availability: Option<String>,
}

fn run_index(
    folder: &Path,
    artifact: Option<&Path>,
    catalog_path: Option<&Path>,
    hemisphere: Hemisphere,
    min_spacing: f64,
    tolerance: f64,
    verbose: bool,
) {
    println!("\n{}", "=".repeat(60));
    println!("Loading CSV files from: {}", folder.display());
    println!("{}", "=".repeat(60));

    let mut csv_tracks = Vec::new();
    let entries = match fs::read_dir(folder) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error reading folder: {}", e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "csv") {
            continue;
        }
        if verbose {
            println!("\n  Processing: {}", path.display());
        }
        match parse_csv_file(&path, hemisphere) {
            Ok(track) => {
                println!(
                    "  [OK] {} - {} points",
                    track.raw.identity.display_name(),
                    track.raw.coords.len()
                );
                csv_tracks.push(track);
            }
            Err(e) => {
                eprintln!("  [ERR] Failed to parse {}: {}", path.display(), e);
            }
        }
    }

    println!("\nLoaded {} source tracks", csv_tracks.len());
    if csv_tracks.is_empty() {
        println!("Nothing to index");
        return;
    }

    // Availability catalog: per-row codes first, catalog file overrides.
    let mut catalog = AvailabilityCatalog::new();
    for track in &csv_tracks {
        if let Some(code) = &track.availability {
            if let Some(status) = AvailabilityStatus::from_code(code) {
                catalog.insert(track.raw.identity.campaign.clone(), status);
            }
        }
    }
    if let Some(path) = catalog_path {
        match load_catalog(path) {
            Ok(entries) => {
                for (campaign, status) in entries {
                    catalog.insert(campaign, status);
                }
            }
            Err(e) => eprintln!("  [ERR] Failed to read catalog {}: {}", path.display(), e),
        }
    }

    println!("\n{}", "=".repeat(60));
    println!("NORMALIZE / FILTER / SIMPLIFY");
    println!("{}", "=".repeat(60));

    let config = PipelineConfig {
        min_spacing_meters: min_spacing,
        line_tolerance_meters: tolerance,
        ..PipelineConfig::default()
    };
    let registry = ConventionRegistry::default();

    let raws: Vec<RawTrack> = csv_tracks.into_iter().map(|t| t.raw).collect();
    let (tracks, pipeline_skipped) = build_tracks(raws, &config, &registry);

    println!(
        "  Built {} tracks ({} skipped)",
        tracks.len(),
        pipeline_skipped.len()
    );
    if verbose {
        for track in &tracks {
            println!(
                "    {} -> {} points",
                track.identity.display_name(),
                track.points.len()
            );
        }
    }

    println!("\n{}", "=".repeat(60));
    println!("INDEXING");
    println!("{}", "=".repeat(60));

    let mut store = MemoryStore::new();
    let mut indexer = TrackIndexer::new(&mut store, &registry);
    let summary = match indexer.index_tracks(&tracks) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Indexing aborted: {}", e);
            return;
        }
    };

    println!("\n{}", "-".repeat(60));
    println!(
        "RESULTS: {} tracks in {} layers",
        summary.tracks_indexed, summary.layers_created
    );
    println!("{}", "-".repeat(60));

    for info in store.list_layers() {
        println!(
            "  {} [{:?}, {}] - {} features",
            info.name,
            info.kind,
            info.hemisphere.crs_identifier(),
            info.feature_count
        );
    }

    let all_skipped: Vec<_> = pipeline_skipped.iter().chain(summary.skipped.iter()).collect();
    if !all_skipped.is_empty() {
        println!("\nSkipped tracks:");
        for skip in all_skipped {
            println!("  - {}: {}", skip.name, skip.reason);
        }
    }

    // Style tree + artifact
    let project = match build_style_project(&store, &catalog, hemisphere) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Style build failed: {}", e);
            return;
        }
    };

    println!(
        "\nStyle project: {} institution groups, {} layers, CRS {}",
        project.groups.len(),
        project.layer_count(),
        project.crs
    );
    for group in &project.groups {
        println!("  {} ({} layers)", group.institution, group.layers.len());
        if verbose {
            for layer in &group.layers {
                println!(
                    "    - {} [{:?}] {} {:?}",
                    layer.layer_name,
                    layer.status,
                    layer.color.hex(),
                    layer.symbol
                );
            }
        }
    }

    if let Some(path) = artifact {
        match write_project(&project, path) {
            Ok(()) => println!("\n[Export] Written style artifact: {}", path.display()),
            Err(e) => eprintln!("\n[Export] Failed to write {}: {}", path.display(), e),
        }
    }
}

/// Parse one coordinate CSV into a raw track.
///
/// Projected `ps71_easting`/`ps71_northing` columns win over geographic
/// `latitude`/`longitude` ones. Metadata is taken from the first row;
/// the granule name falls back to the file stem.
fn parse_csv_file(path: &Path, default_hemisphere: Hemisphere) -> Result<CsvTrack, String> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| e.to_string())?;
    let headers = reader.headers().map_err(|e| e.to_string())?.clone();
    let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

    let projected = column("ps71_easting").zip(column("ps71_northing"));
    let geographic = column("latitude").zip(column("longitude"));
    let (x_col, y_col, is_projected) = match (projected, geographic) {
        (Some((x, y)), _) => (x, y, true),
        (None, Some((lat, lon))) => (lat, lon, false),
        (None, None) => return Err("no recognized coordinate columns".to_string()),
    };

    let mut coords = Vec::new();
    let mut meta: HashMap<String, String> = HashMap::new();
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        let x: f64 = record
            .get(x_col)
            .and_then(|v| v.trim().parse().ok())
            .ok_or("bad coordinate value")?;
        let y: f64 = record
            .get(y_col)
            .and_then(|v| v.trim().parse().ok())
            .ok_or("bad coordinate value")?;
        coords.push((x, y));

        if meta.is_empty() {
            for (header, value) in headers.iter().zip(record.iter()) {
                meta.insert(header.to_ascii_lowercase(), value.to_string());
            }
        }
    }
    if coords.is_empty() {
        return Err("no coordinate rows".to_string());
    }

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown");
    let institution = meta.get("institution").cloned().unwrap_or_default();
    let campaign = meta.get("campaign").cloned().unwrap_or_default();
    let granule = meta
        .get("granule")
        .or_else(|| meta.get("segment"))
        .cloned()
        .unwrap_or_else(|| stem.to_string());
    if institution.is_empty() || campaign.is_empty() {
        return Err("missing institution/campaign columns".to_string());
    }

    let hemisphere = match meta.get("region").map(|r| r.to_ascii_lowercase()) {
        Some(region) if region == "arctic" => Hemisphere::Arctic,
        Some(region) if region == "antarctic" => Hemisphere::Antarctic,
        _ => default_hemisphere,
    };

    let identity = SourceIdentity::new(institution, campaign, granule);
    let raw = if is_projected {
        RawTrack::projected(identity, hemisphere, coords)
    } else {
        RawTrack::geographic(identity, hemisphere, coords)
    };

    Ok(CsvTrack {
        raw,
        availability: meta.get("availability").cloned(),
    })
}

/// Load a `campaign,status` catalog CSV.
fn load_catalog(path: &Path) -> Result<Vec<(String, AvailabilityStatus)>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| e.to_string())?;

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        let campaign = record.get(0).unwrap_or("").trim().to_string();
        let code = record.get(1).unwrap_or("").trim();
        if campaign.is_empty() || campaign.eq_ignore_ascii_case("campaign") {
            continue;
        }
        match AvailabilityStatus::from_code(code) {
            Some(status) => entries.push((campaign, status)),
            None => return Err(format!("unknown availability code '{}'", code)),
        }
    }
    Ok(entries)
}
