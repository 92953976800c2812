mod io;
mod provenance;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use hullmix::api::{
    blend_image, compute_hull, decompose_with, harmonize, harmonize_all, random_palette,
    run_pipeline, simplify_with, BlendCfg, ColorWeighting, DecomposeCfg, DenseSimplex,
    HueTemplate, PipelineCfg, PruneCfg, Recorder, ReplayToken, SimplifyCfg,
};
use provenance::Sidecar;
use serde_json::json;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

#[derive(Parser)]
#[command(name = "hullmix")]
#[command(about = "Convex-hull palette extraction and layer decomposition")]
struct Cmd {
    /// Log per-iteration detail
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Convex hull of a point table
    Hull {
        #[arg(long)]
        input: PathBuf,
        /// Coordinate columns, in order
        #[arg(long, value_delimiter = ',', default_value = "r,g,b")]
        columns: Vec<String>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Simplify the hull of a point table to a small palette
    Simplify {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_delimiter = ',', default_value = "r,g,b")]
        columns: Vec<String>,
        #[command(flatten)]
        simplify: SimplifyArgs,
        #[arg(long)]
        out: PathBuf,
    },
    /// Decompose a pixel table (x,y,r,g,b) into palette weight layers
    Decompose {
        #[arg(long)]
        image: PathBuf,
        /// Palette JSON or r,g,b table; extracted from the image when absent
        #[arg(long)]
        palette: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Weighting::Star)]
        weighting: Weighting,
        #[command(flatten)]
        simplify: SimplifyArgs,
        /// Greedily prune the extracted palette
        #[arg(long)]
        prune: bool,
        #[arg(long)]
        out: PathBuf,
    },
    /// Synthesize a palette blend image and run the full pipeline on it
    Demo {
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 6)]
        colors: usize,
        #[arg(long, default_value_t = 32)]
        width: usize,
        #[arg(long, default_value_t = 24)]
        height: usize,
        #[arg(long)]
        out_dir: PathBuf,
    },
    /// Fit hue templates to a palette and snap its hues
    Harmonize {
        /// Palette JSON or r,g,b table
        #[arg(long)]
        palette: PathBuf,
        /// Single template; every template when absent
        #[arg(long, value_enum)]
        template: Option<Template>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

#[derive(Args, Clone, Copy)]
struct SimplifyArgs {
    #[arg(long, default_value_t = 10)]
    target: usize,
    #[arg(long, default_value_t = 500)]
    max_iterations: usize,
    /// Stop early once coverage RMSE exceeds this
    #[arg(long)]
    rmse_tolerance: Option<f64>,
    /// Keep vertices outside the unit cube
    #[arg(long)]
    no_clamp: bool,
}

impl SimplifyArgs {
    fn cfg(self) -> SimplifyCfg {
        SimplifyCfg {
            target_vertex_count: self.target,
            max_iterations: self.max_iterations,
            rmse_tolerance: self.rmse_tolerance,
            clamp_to_unit_cube: !self.no_clamp,
        }
    }

    fn params(self) -> serde_json::Value {
        json!({
            "target": self.target,
            "max_iterations": self.max_iterations,
            "rmse_tolerance": self.rmse_tolerance,
            "clamp": !self.no_clamp,
        })
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Weighting {
    Star,
    Asap,
}

#[derive(Clone, Copy, ValueEnum)]
enum Template {
    Monochromatic,
    Complementary,
    Triadic,
    Square,
    Analogous,
    Split,
    DoubleSplit,
}

impl From<Template> for HueTemplate {
    fn from(t: Template) -> Self {
        match t {
            Template::Monochromatic => HueTemplate::Monochromatic,
            Template::Complementary => HueTemplate::Complementary,
            Template::Triadic => HueTemplate::Triadic,
            Template::Square => HueTemplate::Square,
            Template::Analogous => HueTemplate::Analogous,
            Template::Split => HueTemplate::Split,
            Template::DoubleSplit => HueTemplate::DoubleSplit,
        }
    }
}

impl From<Weighting> for ColorWeighting {
    fn from(w: Weighting) -> Self {
        match w {
            Weighting::Star => ColorWeighting::Star,
            Weighting::Asap => ColorWeighting::Asap,
        }
    }
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = if cmd.verbose { Level::DEBUG } else { Level::INFO };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .init();
    match cmd.action {
        Action::Hull {
            input,
            columns,
            out,
        } => hull(input, columns, out),
        Action::Simplify {
            input,
            columns,
            simplify: simplify_args,
            out,
        } => simplify(input, columns, simplify_args, out),
        Action::Decompose {
            image,
            palette,
            weighting,
            simplify,
            prune,
            out,
        } => decompose(image, palette, weighting, simplify, prune, out),
        Action::Demo {
            seed,
            colors,
            width,
            height,
            out_dir,
        } => demo(seed, colors, width, height, out_dir),
        Action::Harmonize {
            palette,
            template,
            out,
        } => harmonize_palette(palette, template, out),
        Action::Report => report(),
    }
}

fn hull(input: PathBuf, columns: Vec<String>, out: PathBuf) -> Result<()> {
    let cloud = io::read_points(&input, &columns)?;
    let hull = compute_hull(cloud.points())?;
    tracing::info!(
        points = cloud.len(),
        vertices = hull.vertex_count(),
        facets = hull.facets.len(),
        "hull"
    );
    io::write_json(
        &out,
        &io::HullOut {
            dim: hull.dim,
            vertices: hull.points.iter().map(|p| p.iter().copied().collect()).collect(),
            source: hull.source.clone(),
            facets: hull.facets.iter().map(|f| f.vertices.to_vec()).collect(),
        },
    )?;
    Sidecar::new("hull", json!({ "columns": columns }))
        .input(&input)
        .write_next_to(&out)?;
    Ok(())
}

fn simplify(input: PathBuf, columns: Vec<String>, args: SimplifyArgs, out: PathBuf) -> Result<()> {
    let cloud = io::read_points(&input, &columns)?;
    let mut rec = Recorder::default();
    let report = simplify_with(&cloud, &args.cfg(), &DenseSimplex::default(), &mut rec)?;
    for (iteration, vertices) in &rec.iterations {
        tracing::debug!(iteration, vertices, "collapse");
    }
    io::write_json(&out, &io::SimplifyOut::from_report(&report))?;
    let mut params = args.params();
    params["columns"] = json!(columns);
    Sidecar::new("simplify", params).input(&input).write_next_to(&out)?;
    Ok(())
}

fn decompose(
    image_path: PathBuf,
    palette_path: Option<PathBuf>,
    weighting: Weighting,
    args: SimplifyArgs,
    prune: bool,
    out: PathBuf,
) -> Result<()> {
    let image = io::read_image(&image_path)?;
    let decompose_cfg = DecomposeCfg {
        color_weighting: weighting.into(),
    };
    let mut rec = Recorder::default();
    let mut sidecar = Sidecar::new(
        "decompose",
        json!({
            "weighting": format!("{:?}", decompose_cfg.color_weighting),
            "palette": palette_path.is_some(),
        }),
    )
    .input(&image_path);
    let doc = match palette_path {
        Some(path) => {
            let palette = io::read_palette(&path)?;
            let dec = decompose_with(&image, &palette, &decompose_cfg, &mut rec)?;
            sidecar = sidecar.input(&path);
            io::DecomposeOut::new(&image, &dec, None)
        }
        None => {
            let cfg = PipelineCfg {
                simplify: args.cfg(),
                prune: prune.then(PruneCfg::default),
                decompose: decompose_cfg,
            };
            sidecar.params["simplify"] = args.params();
            sidecar.params["prune"] = json!(prune);
            let output = run_pipeline(&image, &cfg, &mut rec)?;
            let palette_out = out.with_file_name("palette.json");
            io::write_json(&palette_out, &io::PaletteFile::from_palette(&output.palette))?;
            io::DecomposeOut::new(&image, &output.decomposition, Some(&output.diagnostics))
        }
    };
    io::write_json(&out, &doc)?;
    sidecar.write_next_to(&out)?;
    Ok(())
}

fn demo(seed: u64, colors: usize, width: usize, height: usize, out_dir: PathBuf) -> Result<()> {
    let source = random_palette(colors, ReplayToken::new(seed, 0))?;
    let image = blend_image(
        &source,
        BlendCfg {
            width,
            height,
            ..BlendCfg::default()
        },
        ReplayToken::new(seed, 1),
    )?;
    let image_path = out_dir.join("image.csv");
    io::write_image_csv(&image_path, &image)?;
    io::write_json(&out_dir.join("source_palette.json"), &io::PaletteFile::from_palette(&source))?;

    let cfg = PipelineCfg {
        simplify: SimplifyCfg {
            target_vertex_count: colors.max(4),
            ..SimplifyCfg::default()
        },
        ..PipelineCfg::default()
    };
    let output = run_pipeline(&image, &cfg, &mut Recorder::default())?;
    tracing::info!(
        source_colors = colors,
        extracted = output.palette.len(),
        rmse = output.diagnostics.rmse,
        "demo"
    );
    let palette_path = out_dir.join("palette.json");
    io::write_json(&palette_path, &io::PaletteFile::from_palette(&output.palette))?;
    let layers_path = out_dir.join("layers.json");
    io::write_json(
        &layers_path,
        &io::DecomposeOut::new(&image, &output.decomposition, Some(&output.diagnostics)),
    )?;
    Sidecar::new(
        "demo",
        json!({ "seed": seed, "colors": colors, "width": width, "height": height }),
    )
    .input(&image_path)
    .write_next_to(&layers_path)?;
    Ok(())
}

fn harmonize_palette(path: PathBuf, template: Option<Template>, out: PathBuf) -> Result<()> {
    let palette = io::read_palette(&path)?;
    let results = match template {
        Some(t) => vec![harmonize(&palette, t.into())?],
        None => harmonize_all(&palette)?,
    };
    for h in &results {
        tracing::info!(
            template = h.fit.template.name(),
            alpha = h.fit.alpha,
            alpha2 = h.fit.alpha2,
            optimality = h.fit.optimality(),
            "harmonized"
        );
    }
    let doc: Vec<io::HarmonizeOut> = results.iter().map(io::HarmonizeOut::from).collect();
    io::write_json(&out, &doc)?;
    let name = template.map(|t| HueTemplate::from(t).name()).unwrap_or("all");
    Sidecar::new("harmonize", json!({ "template": name }))
        .input(&path)
        .write_next_to(&out)?;
    Ok(())
}

fn report() -> Result<()> {
    let obj = json!({
        "code_rev": provenance::code_revision(),
        "hullmix_version": hullmix::VERSION,
        "params": {},
        "outputs": []
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
