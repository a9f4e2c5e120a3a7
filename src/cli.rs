use crate::config::load_config;
use crate::dataview::DataView;
use crate::host::StaticHost;
use crate::layout_dump::write_layout_dump;
use crate::render::{write_output_png, write_output_svg};
use crate::visual::{MekkoVisual, Viewport};
use crate::RenderOptions;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use serde_json::Value;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "mekko", version, about = "Marimekko chart renderer in Rust")]
pub struct Args {
    /// Input data view (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, layout constants, size)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Settings JSON (format-pane property bag); replaces the data view's own objects
    #[arg(short = 's', long = "settings")]
    pub settings: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Write the computed layout as JSON
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,

    /// Measure text with the built-in width table instead of system fonts
    #[arg(long = "fastText")]
    pub fast_text: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let mut options = RenderOptions {
        config: load_config(args.config.as_deref())?,
        fast_text: args.fast_text,
    };
    if let Some(width) = args.width {
        options.config.render.width = width;
    }
    if let Some(height) = args.height {
        options.config.render.height = height;
    }
    let settings = match args.settings.as_deref() {
        Some(path) => Some(read_settings(path)?),
        None => None,
    };

    let input = read_input(args.input.as_deref())?;
    let mut views = parse_input(&input)?;
    if let Some(settings) = settings {
        for view in views.iter_mut().flatten() {
            view.metadata.objects = Some(settings.clone());
        }
    }

    let outputs = if views.len() > 1 {
        resolve_multi_outputs(args.output.as_deref(), args.output_format, views.len())?
            .into_iter()
            .map(Some)
            .collect()
    } else {
        vec![args.output.clone()]
    };

    let viewport = Viewport {
        width: options.config.render.width,
        height: options.config.render.height,
    };
    for (view, output) in views.iter().zip(outputs) {
        let mut visual =
            MekkoVisual::with_measurer(StaticHost::new(), options.config.clone(), options.measurer());
        let svg = visual.update(view.as_ref(), viewport);
        if let (Some(path), Some(layout)) = (args.dump_layout.as_deref(), visual.layout()) {
            write_layout_dump(path, layout)?;
        }
        match args.output_format {
            OutputFormat::Svg => {
                write_output_svg(&svg, output.as_deref())?;
            }
            OutputFormat::Png => {
                let output = ensure_output(&output, "png")?;
                write_output_png(&svg, &output, &options.config.render)?;
            }
        }
        info!("rendered {} bars", visual.model().bars.len());
    }

    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()));
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn read_settings(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(serde_json::from_str(&contents)?)
}

/// One data view, or an array rendered to numbered outputs. Blank input is a
/// single absent data view, which renders the placeholder.
fn parse_input(input: &str) -> Result<Vec<Option<DataView>>> {
    if input.trim().is_empty() {
        return Ok(vec![None]);
    }
    let views = match serde_json::from_str::<Value>(input)? {
        Value::Array(items) if items.is_empty() => vec![None],
        Value::Array(items) => items
            .into_iter()
            .map(|item| Some(DataView::from_value(item)))
            .collect(),
        value => vec![Some(DataView::from_value(value))],
    };
    Ok(views)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

fn resolve_multi_outputs(
    output: Option<&Path>,
    format: OutputFormat,
    count: usize,
) -> Result<Vec<PathBuf>> {
    let ext = match format {
        OutputFormat::Svg => "svg",
        OutputFormat::Png => "png",
    };
    let base =
        output.ok_or_else(|| anyhow::anyhow!("Output path required for multiple data views"))?;
    if base.is_dir() {
        return Ok((0..count)
            .map(|idx| base.join(format!("chart-{}.{}", idx + 1, ext)))
            .collect());
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("chart");
    let parent = base.parent().unwrap_or_else(|| Path::new("."));
    Ok((0..count)
        .map(|idx| parent.join(format!("{}-{}.{}", stem, idx + 1, ext)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_and_multiple_views() {
        assert_eq!(parse_input("").unwrap().len(), 1);
        assert!(parse_input("").unwrap()[0].is_none());
        assert_eq!(parse_input("[]").unwrap().len(), 1);
        let many = parse_input(r#"[{ "matrix": null }, {}]"#).unwrap();
        assert_eq!(many.len(), 2);
        let single = parse_input(r#"{ "metadata": { "objects": { "legend": {} } } }"#).unwrap();
        assert!(single[0].as_ref().and_then(DataView::objects).is_some());
        let odd = parse_input(r#"[5, { "matrix": { "rows": 1 } }]"#).unwrap();
        assert_eq!(odd.len(), 2);
        assert!(odd.iter().flatten().all(|view| view.category_rows().is_empty()));
        assert!(parse_input("{ nope").is_err());
    }

    #[test]
    fn multi_outputs_are_numbered() {
        let outputs =
            resolve_multi_outputs(Some(Path::new("out/chart.svg")), OutputFormat::Svg, 2).unwrap();
        assert_eq!(
            outputs,
            vec![PathBuf::from("out/chart-1.svg"), PathBuf::from("out/chart-2.svg")]
        );
        assert!(resolve_multi_outputs(None, OutputFormat::Png, 2).is_err());
    }
}
