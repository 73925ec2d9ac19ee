//! CLI tool to run a saved screenshot through every screen-state detector.
//! Usage:
//!   cargo run -p poke-vision --features cli --bin analyze_frame -- \
//!       <screenshot.png> [profile] [output_dir]

use anyhow::{bail, Context, Result};
use poke_capture::{crop_region, Frame};
use poke_data::SpeciesCatalog;
use poke_vision::stats::mean_color;
use poke_vision::{ClassifierConfig, NameReader, Profile, ScreenClassifier, TesseractRecognizer};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    // Initialize tracing for debug output
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <screenshot.png> [profile] [output_dir]", args[0]);
        std::process::exit(1);
    }

    let input_path = PathBuf::from(&args[1]);
    let profile = match args.get(2) {
        Some(name) => match Profile::parse(name) {
            Some(p) => p,
            None => bail!("Unknown profile '{}' (expected default or sword_shield)", name),
        },
        None => Profile::Default,
    };
    let output_dir = args
        .get(3)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./debug_output"));
    let _ = std::fs::create_dir_all(&output_dir);

    println!("Loading image: {}", input_path.display());
    let img = image::open(&input_path)
        .with_context(|| format!("Failed to open {}", input_path.display()))?
        .to_rgb8();
    println!("Image size: {}x{}", img.width(), img.height());

    let config = match std::env::var_os("SHINY_BOT_CONFIG") {
        Some(path) => ClassifierConfig::load(Path::new(&path))?,
        None => ClassifierConfig::default(),
    };
    let catalog = SpeciesCatalog::load(Path::new("data"))?;
    let reader = NameReader::new(Box::new(TesseractRecognizer::new()), Some(catalog));
    if !reader.is_available() {
        println!("Tesseract not available! Names will read as empty");
    }
    let classifier = ScreenClassifier::new(config)?.with_name_reader(reader);

    let mut store = classifier.frame_store(Frame::new(img)?);
    let (target_w, target_h) = store.target();
    let canonical = store.resize();
    println!(
        "Canonical size: {}x{} (fits {}x{}, profile {})",
        canonical.width(),
        canonical.height(),
        target_w,
        target_h,
        profile
    );
    let ocr = classifier.ocr_settings(profile)?;
    println!("OCR: {:?} text, threshold {}", ocr.polarity, ocr.threshold);

    println!("\n=== Regions ===");
    for name in classifier.regions().names(profile) {
        let region = classifier.regions().region_for(name, profile)?;
        let canonical = store.canonical()?;
        let mean = mean_color(canonical.image(), &region, 4)
            .map(|[r, g, b]| format!("mean rgb ({:.0}, {:.0}, {:.0})", r, g, b))
            .unwrap_or_else(|| "outside frame".to_string());
        println!(
            "{}: x={} y={} w={} h={} {}",
            name, region.x, region.y, region.width, region.height, mean
        );
        if let Some(crop) = crop_region(canonical, &region) {
            let _ = crop.save(output_dir.join(format!("{}.png", name)));
        }
    }

    println!("\n=== Screen State ===");
    let state = classifier.classify(&store, profile)?;
    println!("Text box:        {}", state.text_box);
    println!("Life box:        {}", state.life_box);
    println!("Black screen:    {}", state.black_screen);
    println!("White screen:    {}", state.white_screen);
    if let Some(combat) = state.combat_text_box {
        println!("Combat text box: {}", combat);
    }
    println!(
        "Creature name:   {:?}",
        classifier.creature_name(&store, profile)?
    );
    println!("\n{}", serde_json::to_string_pretty(&state)?);

    println!("\nRegion crops saved to: {}", output_dir.display());
    Ok(())
}
