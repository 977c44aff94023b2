use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use svg::{
    node::element::{path::Data, Path},
    Document,
};
use tracing_subscriber::EnvFilter;

use outlook::{Outline, Outlook, ParseConfig};
use planar::Polygon;

#[derive(Parser)]
struct Args {
    /// The outline, as JSON.
    outline: PathBuf,
    /// The bulletin text.
    bulletin: PathBuf,
    output: PathBuf,

    #[arg(long, default_value = "categorical")]
    product: String,

    /// A JSON file of parse settings.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    extension_fraction: Option<f64>,

    #[arg(long)]
    erosion_tolerance: Option<f64>,

    /// Also write the product's regions here, as JSON.
    #[arg(long)]
    json: Option<PathBuf>,
}

/// Longitude goes right and latitude goes up.
fn polygon_data(poly: &Polygon) -> Data {
    let mut data = Data::new();
    for ring in poly.rings() {
        let mut points = ring.points().iter();
        if let Some(p) = points.next() {
            data = data.move_to((p.x, -p.y));
        }
        for p in points {
            data = data.line_to((p.x, -p.y));
        }
        data = data.close();
    }
    data
}

pub fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ParseConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => ParseConfig::default(),
    };
    if let Some(f) = args.extension_fraction {
        config.construction.extension_fraction = f;
    }
    if let Some(t) = args.erosion_tolerance {
        config.construction.erosion_tolerance = t;
    }

    let outline = Arc::new(Outline::read(&args.outline)?);
    let outlook = Outlook::read_with(&args.bulletin, Arc::clone(&outline), &config)?;
    let product = outlook
        .product(&args.product)
        .ok_or_else(|| anyhow::anyhow!("no {} product in the bulletin", args.product))?;
    eprintln!(
        "{} issued {}, valid {} to {}",
        product.name(),
        outlook.issued(),
        outlook.valid().start,
        outlook.valid().end
    );
    for err in product.errors() {
        eprintln!("skipped: {err}");
    }

    let (min, max) = outline
        .polygon()
        .bounding_box()
        .ok_or_else(|| anyhow::anyhow!("empty outline"))?;
    let pad = 1.0;
    let width = max.x - min.x + 2.0 * pad;
    let height = max.y - min.y + 2.0 * pad;
    let stroke_width = width.max(height) / 1024.0;
    let mut document =
        Document::new().set("viewBox", (min.x - pad, -max.y - pad, width, height));

    document = document.add(
        Path::new()
            .set("stroke", "black")
            .set("stroke-width", stroke_width)
            .set("fill", "none")
            .set("d", polygon_data(outline.polygon())),
    );

    let colors = [
        "#76ff7b", "#008b00", "#ffc800", "#f97306", "#ff0000", "#ff00ff", "#912cee", "#104e8b",
    ];
    for (level, color) in product.risk_levels().zip(colors.iter().cycle()) {
        for poly in product.regions(level) {
            document = document.add(
                Path::new()
                    .set("stroke", "black")
                    .set("stroke-width", stroke_width)
                    .set("fill", *color)
                    .set("fill-rule", "evenodd")
                    .set("opacity", 0.6)
                    .set("d", polygon_data(poly)),
            );
        }
    }
    for poly in product.significant() {
        document = document.add(
            Path::new()
                .set("stroke", "black")
                .set("stroke-width", stroke_width)
                .set("stroke-dasharray", format!("{} {}", stroke_width * 4.0, stroke_width * 4.0))
                .set("fill", "none")
                .set("d", polygon_data(poly)),
        );
    }

    svg::save(&args.output, &document)?;
    if let Some(path) = &args.json {
        std::fs::write(path, serde_json::to_string_pretty(product)?)?;
    }

    Ok(())
}
