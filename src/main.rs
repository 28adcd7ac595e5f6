use photolab::prelude::*;
use photolab::state::{CO2_RANGE, LIGHT_RANGE, TEMPERATURE_RANGE};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(String::as_str);

    match cmd {
        None => run_demo(30),
        Some("--help") | Some("-h") | Some("help") => print_help(),
        Some("run") => {
            let ticks = match args.get(2) {
                Some(v) => v.parse().unwrap_or_else(|_| fail("run: tick count must be a number")),
                None => 30,
            };
            run_demo(ticks);
        }
        Some("rate") => {
            if args.len() < 5 {
                fail("rate needs <light> <co2> <temp>");
            }
            let num = |i: usize| -> f64 {
                args[i]
                    .parse()
                    .unwrap_or_else(|_| fail(&format!("not a number: {}", args[i])))
            };
            let params = SimulationParameters {
                light_intensity: num(2),
                co2_level: num(3),
                temperature: num(4),
            };
            print_breakdown(&params);
        }
        Some("sweep") => match args.get(2).map(String::as_str) {
            Some("light") => sweep("light %", LIGHT_RANGE, 5.0, |p, v| p.light_intensity = v),
            Some("co2") => sweep("co2 %", CO2_RANGE, 5.0, |p, v| p.co2_level = v),
            Some("temp") => sweep("temp °C", TEMPERATURE_RANGE, 2.5, |p, v| p.temperature = v),
            _ => fail("sweep needs one of: light, co2, temp"),
        },
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            print_help();
            std::process::exit(2);
        }
    }
}

fn fail(msg: &str) -> ! {
    eprintln!("{}", msg);
    std::process::exit(1);
}

fn print_help() {
    println!("photolab (photosynthesis rate lab, headless)");
    println!("usage:");
    println!("  photolab                      scripted session, 30 ticks");
    println!("  photolab run [ticks]          scripted session");
    println!("  photolab rate <light> <co2> <temp>");
    println!("  photolab sweep <light|co2|temp>");
    println!("  photolab --help");
    println!();
    println!("For a live one-second clock, run `photolabd` and talk to it with `photolab-cli`.");
}

fn bar(rate: f64) -> String {
    "#".repeat((rate / 2.0).round() as usize)
}

fn print_breakdown(params: &SimulationParameters) {
    let b = RateBreakdown::of(params);
    println!(
        "light={:.1}% co2={:.1}% temp={:.1}°C",
        params.light_intensity, params.co2_level, params.temperature
    );
    println!(
        "factors: light={:.3} co2={:.3} temperature={:.3} limiting={}",
        b.light_factor,
        b.co2_factor,
        b.temperature_factor,
        b.limiting().label()
    );
    println!("rate={:.2}%", b.rate);
}

fn sweep(
    label: &str,
    (lo, hi): (f64, f64),
    step: f64,
    set: impl Fn(&mut SimulationParameters, f64),
) {
    println!("{:>8}  {:>6}  limiting", label, "rate");
    let mut v = lo;
    while v <= hi + 1e-9 {
        let mut p = SimulationParameters::default();
        set(&mut p, v);
        let b = RateBreakdown::of(&p);
        println!(
            "{:>8.1}  {:>6.2}  {:<8}  {}",
            v,
            b.rate,
            b.limiting().label(),
            bar(b.rate)
        );
        v += step;
    }
}

/// Drive a lab through a short script of control changes, one logical tick at a time.
fn run_demo(ticks: u64) {
    let mut lab = Lab::new();

    // (tick, label, change)
    let script: [(u64, &str, ParameterUpdate); 4] = [
        (
            8,
            "clouds roll in",
            ParameterUpdate {
                light_intensity: Some(15.0),
                ..ParameterUpdate::default()
            },
        ),
        (
            14,
            "sun returns, CO2 enriched",
            ParameterUpdate {
                light_intensity: Some(90.0),
                co2_level: Some(70.0),
                ..ParameterUpdate::default()
            },
        ),
        (
            20,
            "heat wave",
            ParameterUpdate {
                temperature: Some(44.0),
                ..ParameterUpdate::default()
            },
        ),
        (
            26,
            "evening cools to optimum",
            ParameterUpdate {
                temperature: Some(30.0),
                ..ParameterUpdate::default()
            },
        ),
    ];

    for t in 0..ticks {
        for (at, label, update) in script.iter() {
            if *at == t {
                lab.update_parameters(*update);
                let s = lab.state();
                println!(
                    "-- {} (light={:.0} co2={:.0} temp={:.0})",
                    label, s.params.light_intensity, s.params.co2_level, s.params.temperature
                );
            }
        }
        if let Some(p) = lab.tick() {
            println!(
                "t={:>3} rate={:>6.2}% {:<8} {}",
                p.time,
                p.rate,
                limiting_factor(&lab.params()).label(),
                bar(p.rate)
            );
        }
    }

    let snap = LabAdapter::new(&lab).snapshot();
    println!();
    println!(
        "window: {} samples (t={}..{}), ticks={}",
        snap.history.len(),
        snap.history.first().map(|p| p.time).unwrap_or(0),
        snap.history.last().map(|p| p.time).unwrap_or(0),
        snap.ticks
    );
    if let Some(best) = snap
        .history
        .iter()
        .max_by(|a, b| a.rate.total_cmp(&b.rate))
    {
        println!("peak in window: t={} rate={:.2}%", best.time, best.rate);
    }
}
