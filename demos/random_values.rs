use flowmeter::{Color, FlowMeter, FlowMeterCommand, FlowMeterConfig, TextStyle};
use rand::Rng;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let config = FlowMeterConfig::builder()
        .title("Random flow".to_string())
        .breakpoints(vec![0, 50, 200, 1000])
        .minor_labels(vec!["Low".into(), "Normal".into(), "Heavy".into()])
        .minor_steps_per_interval(4)
        .unit_info(" l/h".to_string())
        .value_level_pattern("Level: {level}".to_string())
        .date_pattern("Sample #{date}".to_string())
        .value_style(TextStyle::new(26.0, Color::WHITE))
        .animation_duration(Duration::from_millis(1500))
        .build();

    let meter = FlowMeter::new(config)?;
    let (sender, receiver) = mpsc::channel();

    thread::spawn(move || {
        let mut rng = rand::rng();
        for sample in 1u32.. {
            let mut commands = vec![
                FlowMeterCommand::SetInfo(sample.to_string()),
                FlowMeterCommand::SetValue {
                    value: rng.random_range(0..=1000),
                    animate: true,
                    // every fifth sample sweeps up from zero
                    reset: sample % 5 == 0,
                },
            ];
            if sample % 12 == 0 {
                let top = rng.random_range(600..=1500);
                commands.push(FlowMeterCommand::SetCalibration {
                    breakpoints: vec![0, top / 20, top / 5, top],
                    minor_labels: Some(vec!["Low".into(), "Normal".into(), "Heavy".into()]),
                    minor_steps: rng.random_range(1..=5),
                });
            }

            if commands.into_iter().any(|cmd| sender.send(cmd).is_err()) {
                break;
            }
            thread::sleep(Duration::from_millis(2000));
        }
    });

    println!("Displaying a flow meter fed with random readings");
    println!("Press Ctrl+C to exit");

    meter.show_with_commands(receiver)
}
