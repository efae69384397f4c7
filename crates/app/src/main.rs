use clap::{Args, Parser, Subcommand, ValueEnum};
use pintograph_core::{
    timeline::parse_assignment, Cadence, CommandRecorder, ConfigStore, HuePolicy, LiveConfig,
    Param, ParameterPanel, RenderOptions, ScheduledTweak, Simulation, SimulationOptions,
    TweakScheduler,
};
use tracing_subscriber::EnvFilter;

fn main() -> pintograph_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Params => {
            print_params();
            Ok(())
        }
    }
}

fn run(args: RunArgs) -> pintograph_core::Result<()> {
    let mut store = ConfigStore::default();
    for assignment in &args.set {
        let (param, value) = parse_assignment(assignment)?;
        store.set(param, value)?;
    }

    let options = SimulationOptions {
        render: RenderOptions {
            wireframes: args.wireframes,
            ..RenderOptions::default()
        },
        hue_policy: args.hue_policy.into(),
    };
    let panel = ParameterPanel::default();
    for tweak in &args.tweak {
        panel.slider(tweak.param)?;
    }

    let mut sim = Simulation::with_options(store, options);
    let mut tweaks = TweakScheduler::new(args.tweak);
    let mut cadence = Cadence::new(args.physics_hz, args.display_hz)?;
    let mut surface = CommandRecorder::new();

    tracing::info!(
        frames = args.frames,
        physics_hz = args.physics_hz,
        display_hz = args.display_hz,
        "starting run"
    );

    let mut skipped_ticks = 0;
    for frame in 0..args.frames {
        for tweak in tweaks.due(frame) {
            panel.slide(sim.config_mut(), tweak.param, tweak.value)?;
            tracing::info!(frame, param = %tweak.param, value = tweak.value, "slider moved");
        }

        let ticks = cadence.ticks_for_next_frame();
        let report = sim.advance_frame(ticks, &mut surface);
        let commands = surface.take();
        skipped_ticks += report.skipped_ticks;

        if args.report_every > 0 && frame % args.report_every == 0 {
            let marker = sim.mechanism().marker_state(sim.world());
            tracing::info!(
                frame,
                ticks = report.ticks,
                trail = report.trail_len,
                evicted = report.evicted,
                marker_x = marker.position.x,
                marker_y = marker.position.y,
                speed = marker.speed,
                draw_calls = commands.len(),
                "frame"
            );
        }
    }

    tracing::info!(
        frames = cadence.frames(),
        ticks = cadence.ticks(),
        skipped_ticks,
        trail = sim.trail().len(),
        pending_tweaks = tweaks.remaining(),
        "run finished"
    );
    if let Some(extent) = sim.trail().extent() {
        tracing::info!(
            min_x = extent.min.x,
            min_y = extent.min.y,
            max_x = extent.max.x,
            max_y = extent.max.y,
            "trail extent"
        );
    }

    if args.dump_config {
        println!("{}", sim.config().to_json()?);
    }
    Ok(())
}

fn print_params() {
    let defaults = LiveConfig::default();
    let panel = ParameterPanel::default();
    println!(
        "{:<18} {:>8} {:>8} {:>8}  {:<5} {}",
        "name", "default", "min", "max", "live", "slider"
    );
    for param in Param::ALL {
        let spec = param.spec();
        let slider = panel.sliders().iter().any(|slider| slider.param == param);
        println!(
            "{:<18} {:>8} {:>8} {:>8}  {:<5} {}",
            param.as_str(),
            defaults.get(param),
            spec.min,
            spec.max,
            spec.live,
            if slider { "yes" } else { "-" }
        );
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Two-wheel pintograph simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the mechanism headless for a number of display frames.
    Run(RunArgs),
    /// List every tunable parameter with its range and default.
    Params,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Number of display frames to render.
    #[arg(short, long, default_value_t = 600)]
    frames: u64,
    /// Physics ticks per second.
    #[arg(long, default_value_t = 60.0)]
    physics_hz: f64,
    /// Display refresh rate in frames per second.
    #[arg(long, default_value_t = 60.0)]
    display_hz: f64,
    /// Initial parameter value, as `name=value`. Repeatable.
    #[arg(short, long, value_name = "NAME=VALUE")]
    set: Vec<String>,
    /// Slider move replayed at a frame, as `frame:name=value`. Repeatable.
    #[arg(short, long, value_name = "FRAME:NAME=VALUE")]
    tweak: Vec<ScheduledTweak>,
    /// Outline bodies instead of filling them.
    #[arg(long)]
    wireframes: bool,
    /// How trail hues above 360 degrees become colours.
    #[arg(long, value_enum, default_value_t = HueArg::Wrap)]
    hue_policy: HueArg,
    /// Log a frame summary every N frames (0 disables).
    #[arg(long, default_value_t = 60)]
    report_every: u64,
    /// Print the final configuration as JSON.
    #[arg(long)]
    dump_config: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum HueArg {
    Wrap,
    Clamp,
}

impl From<HueArg> for HuePolicy {
    fn from(value: HueArg) -> Self {
        match value {
            HueArg::Wrap => HuePolicy::Wrap,
            HueArg::Clamp => HuePolicy::Clamp,
        }
    }
}
