use std::io::Read;
use std::str::FromStr;
use userflow::{
    Engine, FileDataSource, FlowConfig, HttpDataSource, SvgRenderOptions, layout_user_flow,
    render_flow_svg,
};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Flow(userflow::Error),
    Json(serde_json::Error),
    EmptyDataset,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Flow(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::EmptyDataset => write!(f, "No user-flow data to render"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<userflow::Error> for CliError {
    fn from(value: userflow::Error) -> Self {
        Self::Flow(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum OutputFormat {
    #[default]
    Svg,
    Scene,
    Layout,
}

impl FromStr for OutputFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "scene" => Ok(Self::Scene),
            "layout" => Ok(Self::Layout),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    input: Option<String>,
    config_path: Option<String>,
    format: OutputFormat,
    out: Option<String>,
    diagram_id: Option<String>,
}

const USAGE: &str = "Usage: userflow-cli [OPTIONS] <INPUT>

Renders a user-flow Sankey payload to SVG (default) or JSON.

INPUT is a JSON file path, '-' for stdin, or an http(s) URL.

Options:
  --format <svg|scene|layout>  Output format (default: svg)
  --config <FILE>              FlowConfig overrides as JSON
  --out <FILE>                 Write output to FILE instead of stdout
  --id <ID>                    Root id for the emitted <svg>
  -h, --help                   Show this help";

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();
    let mut i = 0usize;
    while i < argv.len() {
        let arg = argv[i].as_str();
        match arg {
            "-h" | "--help" => return Err(CliError::Usage(USAGE)),
            "--format" => {
                i += 1;
                let raw = argv.get(i).ok_or(CliError::Usage("--format needs a value"))?;
                args.format = raw
                    .parse()
                    .map_err(|_| CliError::Usage("--format must be svg, scene or layout"))?;
            }
            "--config" => {
                i += 1;
                let raw = argv.get(i).ok_or(CliError::Usage("--config needs a value"))?;
                args.config_path = Some(raw.clone());
            }
            "--out" => {
                i += 1;
                let raw = argv.get(i).ok_or(CliError::Usage("--out needs a value"))?;
                args.out = Some(raw.clone());
            }
            "--id" => {
                i += 1;
                let raw = argv.get(i).ok_or(CliError::Usage("--id needs a value"))?;
                args.diagram_id = Some(raw.clone());
            }
            _ if args.input.is_none() => args.input = Some(arg.to_string()),
            _ => return Err(CliError::Usage("Unexpected extra argument; see --help")),
        }
        i += 1;
    }
    if args.input.is_none() {
        return Err(CliError::Usage(USAGE));
    }
    Ok(args)
}

fn load_config(path: Option<&str>) -> Result<FlowConfig, CliError> {
    match path {
        None => Ok(FlowConfig::default()),
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&text)?)
        }
    }
}

async fn fetch_payload(input: &str) -> Result<serde_json::Value, CliError> {
    use userflow::FlowDataSource;
    if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(serde_json::from_str(&text)?)
    } else if input.starts_with("http://") || input.starts_with("https://") {
        Ok(HttpDataSource::new(input).fetch().await?)
    } else {
        Ok(FileDataSource::new(input).fetch().await?)
    }
}

async fn run(argv: Vec<String>) -> Result<(), CliError> {
    let args = parse_args(&argv)?;
    let config = load_config(args.config_path.as_deref())?;
    let engine = Engine::with_config(config);

    let input = args.input.as_deref().unwrap_or("-");
    let payload = fetch_payload(input).await?;

    let rendered = engine
        .render_payload(&payload)?
        .ok_or(CliError::EmptyDataset)?;

    let output = match args.format {
        OutputFormat::Svg => match args.diagram_id {
            Some(id) => render_flow_svg(
                &rendered.scene,
                &SvgRenderOptions {
                    diagram_id: Some(id),
                },
            ),
            None => rendered.svg,
        },
        OutputFormat::Scene => serde_json::to_string_pretty(&rendered.scene)?,
        OutputFormat::Layout => {
            let layout = layout_user_flow(&rendered.graph, engine.config())
                .map_err(userflow::Error::from)?;
            serde_json::to_string_pretty(&layout)?
        }
    };

    match args.out {
        Some(path) => std::fs::write(path, output)?,
        None => println!("{output}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    if let Err(err) = run(argv).await {
        eprintln!("{err}");
        std::process::exit(match err {
            CliError::Usage(_) => 2,
            _ => 1,
        });
    }
}
