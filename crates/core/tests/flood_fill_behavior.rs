//! Flood fill invariants over whole runs
//!
//! Covers the seed reset, the seed-value upper bound, wall exclusion, the
//! ellipsoid cutoff and the 4x4x4 reference scenario.

use smoke_sim_core::flood_fill::{
    Easing, FillState, FloodFillConfig, FloodFillSimulator, PropagateParams,
};
use smoke_sim_core::{GridCoord, GridIndex, KernelBackend, OccupancyGrid, Vec3};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn unit_grid(nx: usize, ny: usize, nz: usize) -> GridIndex {
    GridIndex::new((nx, ny, nz), Vec3::zeros(), 1.0)
}

/// Grid with a solid wall across x = `wall_x`, optionally with a one-voxel hole
fn walled(nx: usize, n: usize, wall_x: usize, hole: Option<(usize, usize)>) -> OccupancyGrid {
    let grid = unit_grid(nx, n, n);
    let mut cells = vec![0_u32; grid.cell_count()];
    for z in 0..n {
        for y in 0..n {
            if hole != Some((y, z)) {
                cells[grid.flat_index(GridCoord::new(wall_x, y, z))] = 1;
            }
        }
    }
    OccupancyGrid::from_cells(grid, cells).unwrap()
}

fn simulator(config: FloodFillConfig, backend: KernelBackend, cells: usize) -> FloodFillSimulator {
    let mut sim = FloodFillSimulator::new(config, backend).unwrap();
    sim.initialize(cells).unwrap();
    sim
}

fn wide_config() -> FloodFillConfig {
    FloodFillConfig {
        max_seed_value: 30,
        fill_duration: 2.0,
        radius_xz: 10.0,
        radius_y: 10.0,
        ..Default::default()
    }
}

#[test]
fn test_reference_scenario_4x4x4() {
    let occupancy = OccupancyGrid::empty(unit_grid(4, 4, 4));
    let config = FloodFillConfig {
        max_seed_value: 10,
        fill_duration: 1.0,
        radius_xz: 10.0,
        radius_y: 10.0,
        ..Default::default()
    };
    let mut sim = simulator(config, KernelBackend::Serial, occupancy.len());

    sim.seed(&Vec3::new(0.2, 0.4, 0.9), occupancy.grid());
    assert_eq!(sim.seed_state().seed_coord, GridCoord::new(0, 0, 0));

    sim.propagate(1, &occupancy, 1.0).unwrap();
    assert_eq!(sim.current_seed_value(), 10);

    let field = sim.current_field();
    let grid = occupancy.grid();
    assert_eq!(field[grid.flat_index(GridCoord::new(0, 0, 0))], 10);
    assert_eq!(field[grid.flat_index(GridCoord::new(3, 3, 3))], 0);
    // One iteration reaches exactly the face neighbours
    assert!(field[grid.flat_index(GridCoord::new(1, 0, 0))] > 0);
    assert_eq!(field[grid.flat_index(GridCoord::new(1, 1, 0))], 0);
}

#[test]
fn test_every_easing_reaches_max_at_full_time() {
    for easing in [
        Easing::default(),
        Easing::Linear,
        Easing::SmoothStep,
        Easing::EaseOutCubic,
    ] {
        let occupancy = OccupancyGrid::empty(unit_grid(2, 2, 2));
        let config = FloodFillConfig {
            max_seed_value: 10,
            fill_duration: 1.0,
            easing,
            ..Default::default()
        };
        let mut sim = simulator(config, KernelBackend::Serial, occupancy.len());
        sim.seed(&Vec3::zeros(), occupancy.grid());
        sim.propagate(1, &occupancy, 1.0).unwrap();
        assert_eq!(sim.current_seed_value(), 10, "{easing:?}");
    }
}

#[test]
fn test_seed_resets_field_and_clock() {
    let occupancy = OccupancyGrid::empty(unit_grid(6, 6, 6));
    let mut sim = simulator(wide_config(), KernelBackend::Rayon, occupancy.len());

    sim.seed(&Vec3::new(1.0, 1.0, 1.0), occupancy.grid());
    sim.propagate(4, &occupancy, 0.7).unwrap();
    assert!(sim.current_field().iter().filter(|&&v| v > 0).count() > 10);

    sim.seed(&Vec3::new(4.5, 4.5, 4.5), occupancy.grid());
    assert_eq!(sim.state(), FillState::Active);
    assert_eq!(sim.elapsed_time(), 0.0);
    assert_eq!(sim.seed_state().seed_coord, GridCoord::new(4, 4, 4));
    assert!(sim.current_field().iter().all(|&v| v == 0));

    // Restarted ramp: first frame only reaches the new seed's neighbours
    sim.propagate(1, &occupancy, 0.01).unwrap();
    let field = sim.current_field();
    let grid = occupancy.grid();
    assert!(field[grid.flat_index(GridCoord::new(4, 4, 4))] > 0);
    assert_eq!(field[grid.flat_index(GridCoord::new(1, 1, 1))], 0);
}

#[test]
fn test_density_never_exceeds_seed_value() {
    let occupancy = walled(10, 8, 6, Some((3, 3)));
    let mut sim = simulator(wide_config(), KernelBackend::Rayon, occupancy.len());
    sim.seed(&Vec3::new(2.5, 3.5, 3.5), occupancy.grid());

    for _ in 0..30 {
        sim.propagate(2, &occupancy, 0.1).unwrap();
        let bound = sim.current_seed_value();
        let field = sim.current_field();
        assert!(field.iter().all(|&v| (0..=bound).contains(&v)));
    }
}

#[test]
fn test_walls_stay_empty_and_block() {
    let occupancy = walled(10, 6, 5, None);
    let mut sim = simulator(wide_config(), KernelBackend::Serial, occupancy.len());
    sim.seed(&Vec3::new(1.5, 2.5, 2.5), occupancy.grid());

    for _ in 0..40 {
        sim.propagate(1, &occupancy, 0.1).unwrap();
        let field = sim.current_field();
        for (i, &v) in field.iter().enumerate() {
            if occupancy.is_solid_index(i) {
                assert_eq!(v, 0, "solid voxel {i} has density {v}");
            }
        }
    }

    // Sealed wall: nothing on the far side
    let grid = *occupancy.grid();
    let field = sim.current_field();
    let leaked = (0..grid.cell_count())
        .filter(|&i| grid.coord_of(i).x > 5)
        .any(|i| field[i] > 0);
    assert!(!leaked);
    assert!(field[grid.flat_index(GridCoord::new(4, 2, 2))] > 0);
}

#[test]
fn test_smoke_passes_through_hole() {
    let occupancy = walled(10, 6, 5, Some((2, 2)));
    let mut sim = simulator(wide_config(), KernelBackend::Rayon, occupancy.len());
    sim.seed(&Vec3::new(1.5, 2.5, 2.5), occupancy.grid());
    sim.propagate(20, &occupancy, 2.0).unwrap();

    let grid = occupancy.grid();
    let field = sim.current_field();
    assert!(field[grid.flat_index(GridCoord::new(5, 2, 2))] > 0);
    assert!(field[grid.flat_index(GridCoord::new(8, 0, 0))] > 0);
}

#[test]
fn test_ellipsoid_cutoff() {
    let occupancy = OccupancyGrid::empty(unit_grid(15, 15, 15));
    let config = FloodFillConfig {
        max_seed_value: 20,
        fill_duration: 1.0,
        radius_xz: 0.3,
        radius_y: 0.15,
        ..Default::default()
    };
    let mut sim = simulator(config, KernelBackend::Rayon, occupancy.len());
    sim.seed(&Vec3::new(7.5, 7.5, 7.5), occupancy.grid());
    // Enough iterations for the wavefront to cover the whole grid
    sim.propagate(40, &occupancy, 1.0).unwrap();

    let params = PropagateParams {
        seed: GridCoord::new(7, 7, 7),
        seed_value: sim.current_seed_value(),
        radius_xz: config.radius_xz,
        radius_y: config.radius_y,
    };
    let grid = *occupancy.grid();
    let field = sim.current_field();
    for i in 0..grid.cell_count() {
        let coord = grid.coord_of(i);
        if params.ellipsoid_distance(coord) > 1.0 {
            assert_eq!(field[i], 0, "voxel {coord:?} outside the ellipsoid");
        }
    }
    // Radii are 6 voxels across and 3 up
    assert!(field[grid.flat_index(GridCoord::new(12, 7, 7))] > 0);
    assert_eq!(field[grid.flat_index(GridCoord::new(7, 11, 7))], 0);
    assert!(field[grid.flat_index(GridCoord::new(7, 9, 7))] > 0);
}

#[test]
fn test_inactive_propagate_is_noop() {
    let occupancy = OccupancyGrid::empty(unit_grid(3, 3, 3));
    let mut sim = simulator(wide_config(), KernelBackend::Serial, occupancy.len());

    sim.propagate(10, &occupancy, 1.0).unwrap();
    assert_eq!(sim.state(), FillState::Inactive);
    assert!(sim.current_field().iter().all(|&v| v == 0));

    sim.seed(&Vec3::zeros(), occupancy.grid());
    sim.propagate(2, &occupancy, 1.0).unwrap();
    sim.clear();
    sim.propagate(10, &occupancy, 1.0).unwrap();
    assert!(sim.current_field().iter().all(|&v| v == 0));
}

#[test]
fn test_backends_agree() {
    let occupancy = walled(12, 9, 7, Some((4, 5)));
    let mut serial = simulator(FloodFillConfig::default(), KernelBackend::Serial, occupancy.len());
    let mut rayon = simulator(FloodFillConfig::default(), KernelBackend::Rayon, occupancy.len());

    let seed = Vec3::new(3.2, 4.1, 4.8);
    serial.seed(&seed, occupancy.grid());
    rayon.seed(&seed, occupancy.grid());
    for _ in 0..12 {
        serial.propagate(3, &occupancy, 0.25).unwrap();
        rayon.propagate(3, &occupancy, 0.25).unwrap();
        assert_eq!(serial.current_field(), rayon.current_field());
    }
}
