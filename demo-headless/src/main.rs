use clap::Parser;
use smoke_sim_core::mesh::{box_mesh, Triangle};
use smoke_sim_core::{
    DensityStats, FillState, KernelBackend, QualityPreset, SceneConfig, SmokeScene, Vec3,
};
use std::process::ExitCode;

/// Smoke simulation demo with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "smoke-sim-demo")]
#[command(about = "Voxel smoke flood fill demo (headless)", long_about = None)]
struct Args {
    /// Simulation duration in seconds
    #[arg(short, long, default_value_t = 6.0)]
    duration: f32,

    /// Frames per second
    #[arg(long, default_value_t = 30.0)]
    fps: f32,

    /// Quality preset (low, medium, high)
    #[arg(short, long, default_value = "medium")]
    quality: String,

    /// Override the preset voxel size
    #[arg(long)]
    voxel_size: Option<f32>,

    /// Flood fill iterations per frame
    #[arg(short, long, default_value_t = 1)]
    steps: usize,

    /// Room width (x) and depth (z) in world units
    #[arg(long, default_value_t = 6.0)]
    room_size: f32,

    /// Room height in world units
    #[arg(long, default_value_t = 3.0)]
    room_height: f32,

    /// Seed position x,y,z (defaults to the left half of the room near the floor)
    #[arg(long, value_delimiter = ',', num_args = 3)]
    seed: Option<Vec<f32>>,

    /// Report interval in seconds
    #[arg(short, long, default_value_t = 0.5)]
    report_interval: f32,

    /// Run single-threaded
    #[arg(long)]
    serial: bool,

    /// Try the GPU density backend (needs the `gpu` feature)
    #[arg(long)]
    gpu: bool,

    /// Run validation checks instead of the demo
    #[arg(short, long)]
    validate: bool,
}

/// Room shell plus an interior wall with a doorway, split at x = size / 2
fn build_room(size: f32, height: f32) -> Vec<Triangle> {
    let mut triangles = box_mesh(Vec3::zeros(), Vec3::new(size, height, size));

    let wall_x = size * 0.5;
    let thickness = 0.1;
    let door_half = size * 0.1;
    let door_height = height * 0.7;
    let door_min = size * 0.5 - door_half;
    let door_max = size * 0.5 + door_half;

    // Wall segments either side of the doorway
    triangles.extend(box_mesh(
        Vec3::new(wall_x - thickness, 0.0, 0.0),
        Vec3::new(wall_x + thickness, height, door_min),
    ));
    triangles.extend(box_mesh(
        Vec3::new(wall_x - thickness, 0.0, door_max),
        Vec3::new(wall_x + thickness, height, size),
    ));
    // Lintel above the doorway
    triangles.extend(box_mesh(
        Vec3::new(wall_x - thickness, door_height, door_min),
        Vec3::new(wall_x + thickness, height, door_max),
    ));
    triangles
}

/// Occupied voxel counts left and right of the interior wall
fn split_counts(scene: &SmokeScene, wall_x: f32) -> (usize, usize) {
    let grid = scene.occupancy().grid();
    let density = scene.density();
    density
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v > 0)
        .fold((0, 0), |(left, right), (i, _)| {
            if grid.cell_center(grid.coord_of(i)).x < wall_x {
                (left + 1, right)
            } else {
                (left, right + 1)
            }
        })
}

fn parse_quality(name: &str) -> QualityPreset {
    match name.to_lowercase().as_str() {
        "low" => QualityPreset::Low,
        "high" => QualityPreset::High,
        "medium" => QualityPreset::Medium,
        other => {
            println!("Unknown quality '{}', using medium", other);
            QualityPreset::Medium
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    if args.validate {
        return if run_validation_tests() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    println!("=== Smoke Simulation Demo ===\n");

    let preset = parse_quality(&args.quality);
    let mut config = SceneConfig::from_preset(preset);
    if let Some(size) = args.voxel_size {
        config.voxel_size = size;
    }
    config.steps_per_frame = args.steps;
    config.prefer_gpu = args.gpu;
    if args.serial {
        config.backend = KernelBackend::Serial;
    }

    let triangles = build_room(args.room_size, args.room_height);
    println!(
        "Room {:.1}x{:.1}x{:.1} with interior wall: {} triangles",
        args.room_size,
        args.room_height,
        args.room_size,
        triangles.len()
    );

    let mut scene = match SmokeScene::new(&triangles, config) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Failed to build scene: {e}");
            return ExitCode::FAILURE;
        }
    };

    let grid = *scene.occupancy().grid();
    println!(
        "Voxel grid {}x{}x{} at {:.3} units: {} solid of {} voxels",
        grid.nx,
        grid.ny,
        grid.nz,
        grid.voxel_size,
        scene.occupancy().solid_count(),
        grid.cell_count()
    );
    println!(
        "Density backend: {}",
        if scene.flood_fill().is_gpu_accelerated() { "gpu" } else { "cpu" }
    );

    let seed = match args.seed.as_deref() {
        Some([x, y, z]) => Vec3::new(*x, *y, *z),
        _ => Vec3::new(args.room_size * 0.25, args.room_height * 0.2, args.room_size * 0.5),
    };
    scene.ignite(&seed);
    println!(
        "Igniting at ({:.2}, {:.2}, {:.2})\n",
        seed.x, seed.y, seed.z
    );

    let wall_x = args.room_size * 0.5;
    let dt = 1.0 / args.fps.max(1.0);
    let frames = (args.duration / dt).ceil() as usize;

    println!("Time(s) | Seed | Occupied | Left  | Right | Max | Mean");
    println!("--------|------|----------|-------|-------|-----|------");

    let mut next_report = 0.0;
    for _ in 0..frames {
        if let Err(e) = scene.advance(dt) {
            eprintln!("Simulation step failed: {e}");
            return ExitCode::FAILURE;
        }
        if scene.time() >= next_report {
            let stats = scene.density_stats();
            let (left, right) = split_counts(&scene, wall_x);
            println!(
                "{:7.2} | {:4} | {:8} | {:5} | {:5} | {:3} | {:5.1}",
                scene.time(),
                scene.flood_fill().current_seed_value(),
                stats.occupied,
                left,
                right,
                stats.max,
                stats.mean
            );
            next_report += args.report_interval;
        }
    }

    let stats = scene.density_stats();
    println!("\n=== Simulation Complete ===");
    println!("Final time: {:.2}s", scene.time());
    println!("Smoke voxels: {}", stats.occupied);
    println!("Peak density: {}", stats.max);
    println!(
        "Noise field: {}³ samples at t={:.2}",
        scene.noise().resolution(),
        scene.noise().time()
    );
    ExitCode::SUCCESS
}

/// Quick end-to-end checks on a small scene
fn run_validation_tests() -> bool {
    println!("\n=== Running Validation Tests ===\n");
    let mut passed = true;
    let mut report = |name: &str, ok: bool| {
        println!("  {} {}", if ok { "PASS" } else { "FAIL" }, name);
        passed &= ok;
    };

    let config = SceneConfig {
        voxel_size: 0.25,
        ..SceneConfig::from_preset(QualityPreset::Low)
    };
    let triangles = build_room(4.0, 2.0);
    let mut scene = match SmokeScene::new(&triangles, config) {
        Ok(scene) => scene,
        Err(e) => {
            println!("  FAIL scene construction: {e}");
            return false;
        }
    };

    println!("Test 1: Voxelization");
    report("room shell is solid", scene.occupancy().solid_count() > 0);
    let center = scene.occupancy().grid().world_to_grid(&Vec3::new(1.0, 1.0, 2.0));
    report(
        "room interior is open",
        center.is_some_and(|c| !scene.occupancy().is_solid(c)),
    );

    println!("\nTest 2: Inactive until seeded");
    let stepped = scene.advance(0.1).is_ok();
    report(
        "no smoke before ignition",
        stepped && scene.density_stats() == DensityStats::default(),
    );

    println!("\nTest 3: Growth and bounds");
    scene.ignite(&Vec3::new(1.0, 0.4, 2.0));
    let mut bounded = true;
    let mut walls_clear = true;
    for _ in 0..60 {
        if scene.advance(0.1).is_err() {
            bounded = false;
            break;
        }
        let seed_value = scene.flood_fill().current_seed_value();
        let density = scene.density();
        bounded &= density.iter().all(|&v| (0..=seed_value).contains(&v));
        walls_clear &= density
            .iter()
            .enumerate()
            .all(|(i, &v)| v == 0 || !scene.occupancy().is_solid_index(i));
    }
    report("density never exceeds seed value", bounded);
    report("solid voxels stay empty", walls_clear);
    let (left, right) = split_counts(&scene, 2.0);
    report("smoke fills the seeded side", left > 0);
    report("smoke reaches through the doorway", right > 0);

    println!("\nTest 4: Reset");
    scene.extinguish();
    report(
        "extinguish clears the field",
        scene.flood_fill().state() == FillState::Inactive
            && scene.density_stats() == DensityStats::default(),
    );

    println!();
    passed
}
