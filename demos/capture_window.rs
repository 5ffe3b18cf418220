// Capture one window to a PNG file
//
// Usage: cargo run --example capture_window -- <hwnd> <out.png> [--client]
//            [--mode window|client] [--size-check strict|warn]
//            [--compression fast|default|best]
//
// <hwnd> is decimal or 0x-prefixed hex. Set RUST_LOG=capture_window=debug for
// per-phase logs.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use capture_window::{CaptureMode, CaptureOptions, PngCompression, SizeCheck, WindowHandle};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: capture_window <hwnd> <out.png> [--client] \
[--mode window|client] [--size-check strict|warn] [--compression fast|default|best]";

struct Args {
    window: WindowHandle,
    output: PathBuf,
    mode: CaptureMode,
    options: CaptureOptions,
}

fn parse_hwnd(raw: &str) -> Result<WindowHandle> {
    let value = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => isize::from_str_radix(hex, 16),
        None => raw.parse::<isize>(),
    }
    .with_context(|| format!("invalid window handle {raw:?}"))?;
    Ok(WindowHandle(value))
}

/// Parse an option value with one of the library's `from_name`/`from_mode` parsers.
fn parse_value<T>(
    flag: &str,
    value: Option<String>,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T> {
    let value = value.with_context(|| format!("{flag} needs a value\n{USAGE}"))?;
    parse(&value).with_context(|| format!("invalid value {value:?} for {flag}\n{USAGE}"))
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut positional = Vec::new();
    let mut mode = CaptureMode::default();
    let mut options = CaptureOptions::default();

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--client" => mode = CaptureMode::ClientArea,
            "--mode" => mode = parse_value("--mode", args.next(), CaptureMode::from_name)?,
            "--size-check" => {
                let check = parse_value("--size-check", args.next(), SizeCheck::from_mode)?;
                options = options.with_size_check(check);
            }
            "--compression" => {
                let compression =
                    parse_value("--compression", args.next(), PngCompression::from_mode)?;
                options = options.with_compression(compression);
            }
            flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
            _ => positional.push(arg),
        }
    }

    let [hwnd, output] = <[String; 2]>::try_from(positional)
        .map_err(|_| anyhow::anyhow!("{USAGE}"))?;

    let output = PathBuf::from(output);
    let is_png = output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    if !is_png {
        bail!("output file must have a .png extension: {}", output.display());
    }

    Ok(Args {
        window: parse_hwnd(&hwnd)?,
        output,
        mode,
        options,
    })
}

#[cfg(windows)]
fn run(args: &Args) -> Result<()> {
    use capture_window::WindowCapturer;

    let mut capturer = WindowCapturer::windows(args.options)
        .context("failed to initialise Windows Graphics Capture")?;
    capturer
        .capture(args.window, &args.output, args.mode)
        .with_context(|| format!("failed to capture window {}", args.window))
}

#[cfg(not(windows))]
fn run(_args: &Args) -> Result<()> {
    bail!("window capture requires Windows")
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let result = parse_args(std::env::args().skip(1)).and_then(|args| {
        run(&args)?;
        println!("{:?} of {} saved to {}", args.mode, args.window, args.output.display());
        Ok(())
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
