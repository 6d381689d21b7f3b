mod cases;

use plotink::{BatchReport, CaseOutcome, Harness, HarnessConfig, UploadPolicy};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Harness(plotink::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Harness(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<plotink::Error> for CliError {
    fn from(value: plotink::Error) -> Self {
        Self::Harness(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Run,
    List,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    cases: Vec<String>,
    config: Option<PathBuf>,
    workspace_root: Option<PathBuf>,
    compiler: Option<String>,
    rasterizer: Option<String>,
    dpi: Option<u32>,
    timeout_secs: Option<u64>,
    figure_width: Option<String>,
    upload: Option<UploadPolicy>,
    json: bool,
    pretty: bool,
}

fn usage() -> &'static str {
    "plotink-cli\n\
\n\
USAGE:\n\
  plotink-cli list\n\
  plotink-cli run [--case <name>]... [--config <path>] [--workspace-root <dir>]\n\
                  [--compiler <bin>] [--rasterizer <bin>] [--dpi <n>]\n\
                  [--timeout-secs <n>] [--figure-width <dim>]\n\
                  [--upload auto|always|never] [--json] [--pretty]\n\
\n\
NOTES:\n\
  - run with no --case processes every registered case.\n\
  - --config reads a JSON harness config; explicit flags override it.\n\
  - --json prints a machine-readable report to stdout after the run.\n\
  - exit code 0 means every case passed; 1 means failures or errors.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();
    let mut command_seen = false;

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "list" if !command_seen => {
                args.command = Command::List;
                command_seen = true;
            }
            "run" if !command_seen => {
                args.command = Command::Run;
                command_seen = true;
            }
            "--case" => {
                let Some(name) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.cases.push(name.clone());
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(PathBuf::from(path));
            }
            "--workspace-root" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.workspace_root = Some(PathBuf::from(path));
            }
            "--compiler" => {
                let Some(bin) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.compiler = Some(bin.clone());
            }
            "--rasterizer" => {
                let Some(bin) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.rasterizer = Some(bin.clone());
            }
            "--dpi" => {
                let Some(dpi) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.dpi = Some(dpi.parse::<u32>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--timeout-secs" => {
                let Some(secs) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.timeout_secs =
                    Some(secs.parse::<u64>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--figure-width" => {
                let Some(width) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.figure_width = Some(width.clone());
            }
            "--upload" => {
                let Some(policy) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.upload = Some(match policy.as_str() {
                    "auto" => UploadPolicy::Auto,
                    "always" => UploadPolicy::Always,
                    "never" => UploadPolicy::Never,
                    _ => return Err(CliError::Usage(usage())),
                });
            }
            "--json" => args.json = true,
            "--pretty" => args.pretty = true,
            _ => return Err(CliError::Usage(usage())),
        }
    }

    if !command_seen {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn build_config(args: &Args) -> Result<HarnessConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => HarnessConfig::from_json_file(path)?,
        None => HarnessConfig::default(),
    };
    if let Some(root) = &args.workspace_root {
        config.workspace_root = Some(root.clone());
    }
    if let Some(compiler) = &args.compiler {
        config.compiler = compiler.clone();
    }
    if let Some(rasterizer) = &args.rasterizer {
        config.rasterizer = rasterizer.clone();
    }
    if let Some(dpi) = args.dpi {
        config.dpi = dpi;
    }
    if let Some(secs) = args.timeout_secs {
        config.tool_timeout_secs = secs;
    }
    if let Some(width) = &args.figure_width {
        config.figure_width = width.clone();
    }
    if let Some(upload) = args.upload {
        config.upload = upload;
    }
    Ok(config)
}

#[derive(Serialize)]
struct RunReport<'a> {
    passed: usize,
    failed: usize,
    outcomes: &'a [CaseOutcome],
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

/// Exit code for the run: 0 all passed, 1 otherwise.
fn run(args: Args) -> Result<i32, CliError> {
    let registry = cases::builtin_registry();

    match args.command {
        Command::List => {
            for name in registry.names() {
                println!("{name}");
            }
            Ok(0)
        }
        Command::Run => {
            let harness = Harness::new(build_config(&args)?);

            let report = if args.cases.is_empty() {
                harness.run_all(&registry)
            } else {
                let mut outcomes = Vec::with_capacity(args.cases.len());
                for name in &args.cases {
                    println!("{name}");
                    let outcome = match registry
                        .get(name)
                        .and_then(|case| harness.run_case(case.as_ref()))
                    {
                        Ok(verdict) => CaseOutcome::Verdict(verdict),
                        Err(error) => {
                            println!("error: {error}");
                            CaseOutcome::Error {
                                case: name.clone(),
                                error: error.to_string(),
                            }
                        }
                    };
                    outcomes.push(outcome);
                }
                BatchReport { outcomes }
            };

            println!(
                "{} passed, {} failed ({} case(s))",
                report.passed(),
                report.failed(),
                report.outcomes.len()
            );
            if args.json {
                let out = RunReport {
                    passed: report.passed(),
                    failed: report.failed(),
                    outcomes: &report.outcomes,
                };
                write_json(&out, args.pretty)?;
            }

            Ok(if report.all_passed() { 0 } else { 1 })
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(code) => std::process::exit(code),
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
