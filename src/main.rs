use std::env;
use std::io::{self, BufRead};
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use flowmeter::{FlowMeter, FlowMeterCommand, FlowMeterConfig, RenderError};
use rand::Rng;

#[derive(Debug, Default)]
struct Args {
    title: Option<String>,
    font: Option<String>,
    unit: Option<String>,
    breakpoints: Option<Vec<i32>>,
    minor_steps: Option<usize>,
    demo: bool,
}

fn parse_args() -> Args {
    let mut parsed = Args::default();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--title" => parsed.title = args.next(),
            "--font" => parsed.font = args.next(),
            "--unit" => parsed.unit = args.next(),
            "--breakpoints" => {
                if let Some(list) = args.next() {
                    match list
                        .split(',')
                        .map(|part| part.trim().parse::<i32>())
                        .collect::<Result<Vec<_>, _>>()
                    {
                        Ok(points) => parsed.breakpoints = Some(points),
                        Err(err) => log::warn!("ignoring --breakpoints {list:?}: {err}"),
                    }
                }
            }
            "--minor" => {
                parsed.minor_steps = args.next().and_then(|steps| steps.parse().ok());
            }
            "--demo" => parsed.demo = true,
            other => log::warn!("unknown argument {other:?}"),
        }
    }
    parsed
}

/// Wall clock as `HH:MM:SS` (UTC).
fn clock_text() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
        % 86_400;
    format!("{:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
}

fn send_reading(sender: &Sender<FlowMeterCommand>, value: i32) -> bool {
    let commands = [
        FlowMeterCommand::SetInfo(clock_text()),
        FlowMeterCommand::SetValue {
            value,
            animate: true,
            reset: false,
        },
    ];
    commands.into_iter().all(|cmd| sender.send(cmd).is_ok())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args();
    let font_data = match args.font.as_deref() {
        Some(path) => Some(std::fs::read(path).map_err(RenderError::from)?),
        None => None,
    };

    let config = FlowMeterConfig::builder()
        .maybe_title(args.title)
        .maybe_breakpoints(args.breakpoints)
        .maybe_minor_steps_per_interval(args.minor_steps)
        .maybe_unit_info(args.unit)
        .maybe_font_data(font_data)
        .date_pattern("Updated {date}".to_string())
        .build();

    let meter = FlowMeter::new(config)?;
    let (min, max) = (meter.min(), meter.max());
    let (sender, receiver) = mpsc::channel();

    if args.demo {
        thread::spawn(move || {
            let mut rng = rand::rng();
            while send_reading(&sender, rng.random_range(min..=max)) {
                thread::sleep(Duration::from_secs(3));
            }
        });
    } else {
        // One integer reading per line
        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                match line.trim().parse::<i32>() {
                    Ok(value) => {
                        if !send_reading(&sender, value) {
                            break;
                        }
                    }
                    Err(_) => log::warn!("skipping non-numeric input {line:?}"),
                }
            }
        });
    }

    meter.show_with_commands(receiver)
}
