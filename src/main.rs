//! Uma Scene CLI - parse a training screenshot from disk
//!
//! Used to check calibration and templates against real screenshots without
//! running the whole bot.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use uma_scene::config::{Calibration, NamedRegion};
use uma_scene::game::CardType;
use uma_scene::vision::{CardTemplates, GlyphDigitReader, NccMatcher, Template};
use uma_scene::SceneParser;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Training,
    Support,
    All,
}

#[derive(Debug, Parser)]
#[command(name = "uma-scene", about = "Parse an Umamusume training screenshot")]
struct Args {
    /// Screenshot at the calibrated resolution
    screenshot: PathBuf,

    /// Calibration JSON replacing the built-in tables
    #[arg(long)]
    calibration: Option<PathBuf>,

    /// Directory with card type templates (speed.png, stamina.png, ...)
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Directory with digit glyphs (0.png ... 9.png, variants as 0-b.png)
    #[arg(long)]
    glyphs: Option<PathBuf>,

    /// Match threshold for card type templates
    #[arg(long, default_value_t = Template::DEFAULT_THRESHOLD)]
    threshold: f32,

    #[arg(long, value_enum, default_value_t = Mode::All)]
    mode: Mode,

    /// Save the date and turn counter crops next to the screenshot
    #[arg(long)]
    dump_regions: bool,
}

fn load_templates(dir: &Path, threshold: f32) -> Result<CardTemplates> {
    let mut templates = CardTemplates::new();
    for card_type in CardType::MATCH_PRIORITY {
        let path = dir.join(format!("{}.png", card_type.name()));
        if !path.exists() {
            log::warn!("Missing template {}", path.display());
            continue;
        }
        let image = image::open(&path)
            .with_context(|| format!("Failed to open template {}", path.display()))?
            .to_luma8();
        templates.insert(
            card_type,
            Template::new(card_type.name(), image).with_threshold(threshold),
        );
    }
    Ok(templates)
}

fn load_glyphs(dir: &Path) -> Result<GlyphDigitReader> {
    let mut reader = GlyphDigitReader::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read glyph directory {}", dir.display()))?
    {
        let path = entry?.path();
        let Some(digit) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.chars().next())
        else {
            continue;
        };
        let image = image::open(&path)
            .with_context(|| format!("Failed to open glyph {}", path.display()))?
            .to_luma8();
        reader.add_glyph(digit, image);
    }

    if reader.glyph_count() == 0 {
        bail!("No digit glyphs found in {}", dir.display());
    }
    Ok(reader)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let calibration = match &args.calibration {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Calibration::from_json(&json)?
        }
        None => Calibration::default(),
    };

    let templates = match &args.templates {
        Some(dir) => load_templates(dir, args.threshold)?,
        None => CardTemplates::new(),
    };
    let reader = match &args.glyphs {
        Some(dir) => load_glyphs(dir)?,
        None => GlyphDigitReader::new(),
    };

    let parser = SceneParser::with_calibration(calibration, reader, templates, NccMatcher)?;
    let frame = image::open(&args.screenshot)
        .with_context(|| format!("Failed to open {}", args.screenshot.display()))?
        .to_rgb8();

    if matches!(args.mode, Mode::Training | Mode::All) {
        if args.glyphs.is_none() {
            log::warn!("No --glyphs given, every stat will read as 0");
        }
        let readings = parser.parse_training_readings(&frame)?;
        println!("Training result:");
        println!("{}", serde_json::to_string_pretty(&readings.total())?);
    }

    if matches!(args.mode, Mode::Support | Mode::All) {
        let cards = parser.parse_support_cards(&frame)?;
        println!("Support cards ({}):", cards.len());
        println!("{}", serde_json::to_string_pretty(&cards)?);
    }

    if args.dump_regions {
        for (name, region) in [("date", NamedRegion::Date), ("turn", NamedRegion::TurnToRace)] {
            let crop = parser.extract_region(&frame, region)?;
            let path = args.screenshot.with_extension(format!("{}.png", name));
            crop.save(&path)
                .with_context(|| format!("Failed to save {}", path.display()))?;
            log::info!("Saved {}", path.display());
        }
    }

    Ok(())
}
