use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use clap::{Subcommand, ValueEnum};
use tracing::info;

use followiq_motion::{
    compute_variants, Animator, ClipReveal, CounterAnimator, CounterFormat, Direction,
    EasingChoice, EasingTypeExt, FrameDriver, MotionConfig, MotionConfigExt, RevealOptions,
    ScrollLinkedValue, SpringFilter, SpringParams, Stagger, StaggerFrom, StaggerPolicy,
    TypewriterAnimator, ValueMapper,
};

/// Longest simulated time when measuring how a spring settles
const SPRING_SIM_LIMIT: Duration = Duration::from_secs(10);
const SIM_FRAME: Duration = Duration::from_millis(16);

#[derive(Subcommand)]
pub enum MotionAction {
    /// Count up to a number the way stat blocks do
    Counter {
        target: f64,
        #[arg(long)]
        duration_ms: Option<u64>,
        #[arg(long, default_value = "")]
        prefix: String,
        #[arg(long, default_value = "")]
        suffix: String,
        #[arg(long, default_value_t = 0)]
        decimals: usize,
        /// Print digits without a thousands separator
        #[arg(long)]
        no_separator: bool,
    },
    /// Type text out one character at a time
    Typewriter {
        text: String,
        #[arg(long)]
        tick_ms: Option<u64>,
    },
    /// Print per-child delays of a staggered reveal
    Stagger {
        count: usize,
        #[arg(long)]
        step_ms: Option<u64>,
        /// Gap ratio between consecutive children (1 = linear)
        #[arg(long)]
        decay: Option<f64>,
        #[arg(long, value_enum, default_value_t = FromArg::First)]
        from: FromArg,
        #[arg(long, default_value_t = 0)]
        delay_children_ms: u64,
    },
    /// Show the hidden and visible styles of a reveal and the frames between
    Reveal {
        #[arg(long, default_value = "up")]
        direction: Direction,
        #[arg(long)]
        distance: Option<f64>,
        #[arg(long)]
        blur: Option<f64>,
        #[arg(long)]
        scale: Option<f64>,
        #[arg(long)]
        rotate: Option<f64>,
        /// Clip-path wipe: up, down, left, right or center
        #[arg(long)]
        clip: Option<ClipReveal>,
        #[arg(long)]
        easing: Option<EasingChoice>,
        #[arg(long, default_value_t = 5)]
        steps: usize,
        /// Print the variants as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sample a scroll-linked value across scroll progress
    Scroll {
        /// Progress checkpoints, comma separated
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, default_value = "0,1")]
        input: Vec<f64>,
        /// Output value at each checkpoint
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, default_value = "0,1")]
        output: Vec<f64>,
        #[arg(long, default_value_t = 11)]
        samples: usize,
        /// Smooth with a spring preset
        #[arg(long)]
        spring: Option<SpringParams>,
    },
    /// List spring presets and how they settle
    Springs,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FromArg {
    First,
    Last,
    Center,
}

impl From<FromArg> for StaggerFrom {
    fn from(arg: FromArg) -> Self {
        match arg {
            FromArg::First => StaggerFrom::First,
            FromArg::Last => StaggerFrom::Last,
            FromArg::Center => StaggerFrom::Center,
        }
    }
}

pub async fn run(config: &MotionConfig, action: MotionAction) -> Result<()> {
    match action {
        MotionAction::Counter {
            target,
            duration_ms,
            prefix,
            suffix,
            decimals,
            no_separator,
        } => {
            let duration = match duration_ms {
                Some(_) if config.reduced_motion => Duration::ZERO,
                Some(ms) => Duration::from_millis(ms),
                None => config.counter_duration(),
            };
            let format = CounterFormat::default()
                .with_prefix(prefix)
                .with_suffix(suffix)
                .with_decimals(decimals)
                .with_separator(if no_separator { None } else { Some(',') });

            let mut counter = CounterAnimator::new(duration);
            counter.start(target, Duration::ZERO);
            play(config, counter, |value| format.format(*value)).await
        }
        MotionAction::Typewriter { text, tick_ms } => {
            let tick = match tick_ms {
                Some(_) if config.reduced_motion => Duration::ZERO,
                Some(ms) => Duration::from_millis(ms),
                None => config.typewriter_tick(),
            };
            let mut typer = TypewriterAnimator::new(tick);
            typer.set_text(text, Duration::ZERO);
            play(config, typer, |visible| format!("{}▌", visible)).await
        }
        MotionAction::Stagger {
            count,
            step_ms,
            decay,
            from,
            delay_children_ms,
        } => {
            let mut policy = config.stagger_policy();
            if let Some(ms) = step_ms {
                let step = Duration::from_millis(ms);
                policy = match policy {
                    StaggerPolicy::Linear { .. } => StaggerPolicy::Linear { step },
                    StaggerPolicy::Decay { rate, .. } => StaggerPolicy::Decay { step, rate },
                };
            }
            if let Some(rate) = decay {
                let step = match policy {
                    StaggerPolicy::Linear { step } | StaggerPolicy::Decay { step, .. } => step,
                };
                policy = StaggerPolicy::Decay { step, rate };
            }

            let stagger = Stagger::new(policy)
                .from(from.into())
                .delay_children(Duration::from_millis(delay_children_ms));
            print_stagger(&stagger, count, config.reveal_duration());
            Ok(())
        }
        MotionAction::Reveal {
            direction,
            distance,
            blur,
            scale,
            rotate,
            clip,
            easing,
            steps,
            json,
        } => {
            let options = RevealOptions {
                direction,
                distance: distance.unwrap_or(config.reveal_distance_px),
                blur,
                scale,
                rotate,
                clip,
            };
            let variants = compute_variants(&options);

            if json {
                println!("{}", serde_json::to_string_pretty(&variants)?);
                return Ok(());
            }

            let easing = easing.map(|e| e.0).unwrap_or(config.effective_easing());
            println!("hidden:  {}", variants.hidden.to_css());
            println!("visible: {}", variants.visible.to_css());
            println!("\nFrames ({:?}, {:?}):", easing, config.reveal_duration());
            let steps = steps.max(1);
            for i in 0..=steps {
                let t = i as f64 / steps as f64;
                println!("  t={:.2}  {}", t, variants.at(easing.apply(t)).to_css());
            }
            Ok(())
        }
        MotionAction::Scroll {
            input,
            output,
            samples,
            spring,
        } => {
            let mapper = ValueMapper::new(input, output)?;
            print_scroll(mapper, samples.max(2), spring);
            Ok(())
        }
        MotionAction::Springs => {
            print_springs();
            Ok(())
        }
    }
}

/// Drive `animator` in real time, redrawing one terminal line per frame
async fn play<A, F>(config: &MotionConfig, animator: A, render: F) -> Result<()>
where
    A: Animator + 'static,
    F: Fn(&A::Output) -> String,
{
    let mut handle = FrameDriver::from_config(config).spawn(animator);
    let mut out = std::io::stdout();

    loop {
        tokio::select! {
            frame = handle.next_frame() => {
                let Some(frame) = frame else { break };
                write!(out, "\r\x1b[2K{}", render(&frame.value))?;
                out.flush()?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }
    // Dropping the handle stops the frame task
    drop(handle);
    writeln!(out)?;
    Ok(())
}

fn print_stagger(stagger: &Stagger, count: usize, child_duration: Duration) {
    if count == 0 {
        println!("No children to schedule.");
        return;
    }

    let total = stagger.total_duration(count, child_duration);
    println!("{:?}", stagger.policy);
    println!("{} children, {} ms until the last one finishes\n", count, total.as_millis());

    let scale = if total.is_zero() {
        0.0
    } else {
        40.0 / total.as_secs_f64()
    };
    for i in 0..count {
        let delay = stagger.child_delay(i, count);
        let pad = (delay.as_secs_f64() * scale).round() as usize;
        let bar = ((child_duration.as_secs_f64() * scale).round() as usize).max(1);
        println!(
            "  #{:<3} {:>6} ms  {}{}",
            i,
            delay.as_millis(),
            " ".repeat(pad),
            "█".repeat(bar)
        );
    }
}

fn print_scroll(mapper: ValueMapper, samples: usize, spring: Option<SpringParams>) {
    let mut linked = ScrollLinkedValue::new(mapper.clone());
    if let Some(params) = spring {
        linked = linked.with_spring(params);
        println!("progress    mapped    smoothed ({} ms frames)", SIM_FRAME.as_millis());
    } else {
        println!("progress    mapped");
    }

    for i in 0..samples {
        let p = i as f64 / (samples - 1) as f64;
        let mapped = mapper.map(p);
        if spring.is_some() {
            let smoothed = linked.update(Some(p), SIM_FRAME);
            println!("{:>8.3}  {:>8.3}  {:>8.3}", p, mapped, smoothed);
        } else {
            println!("{:>8.3}  {:>8.3}", p, mapped);
        }
    }
}

fn print_springs() {
    println!(
        "{:<8} {:>9} {:>8} {:>5} {:>7} {:>10} {:>9}",
        "preset", "stiffness", "damping", "mass", "ratio", "overshoot", "settle"
    );
    for name in SpringParams::preset_names() {
        let Ok(params) = name.parse::<SpringParams>() else {
            continue;
        };

        let mut filter = SpringFilter::new(params, 0.0);
        filter.set_target(1.0);
        let mut elapsed = Duration::ZERO;
        let mut peak: f64 = 0.0;
        while !filter.is_settled() && elapsed < SPRING_SIM_LIMIT {
            peak = peak.max(filter.step(SIM_FRAME));
            elapsed += SIM_FRAME;
        }
        let settle = if filter.is_settled() {
            format!("{} ms", elapsed.as_millis())
        } else {
            "> 10 s".to_string()
        };

        println!(
            "{:<8} {:>9} {:>8} {:>5} {:>7.2} {:>9.1}% {:>9}",
            name,
            params.stiffness,
            params.damping,
            params.mass,
            params.damping_ratio(),
            (peak - 1.0).max(0.0) * 100.0,
            settle
        );
    }
}
