//! Integration tests for the epidemic model end to end
//!
//! These walk the public API the way a caller would:
//! - Building city and airport graphs from descriptors
//! - Seeding patient zero
//! - One compute/apply movement round on a small metro
//! - The Euler integrator on its own
//! - Full runs, including failure surfacing

use metro_epidemic::core::config::{SeedLocation, SimulationConfig};
use metro_epidemic::core::error::SimError;
use metro_epidemic::core::types::{CompartmentState, EpidemicParams};
use metro_epidemic::network::{MetroDescriptor, NetworkBuilder, Route, TopologyKind, WeightedGraph};
use metro_epidemic::population::{City, Connections, HubPolicy, PopulationEntity};
use metro_epidemic::simulation::epidemic::euler_step;
use metro_epidemic::simulation::{from_networks_to_populations, Simulation};
use metro_epidemic::transport::{apply_travelers, compute_travelers};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn descriptor(index: usize, name: &str, populations: Vec<f64>) -> MetroDescriptor {
    MetroDescriptor {
        index,
        name: name.to_string(),
        populations,
        epidemic: None,
    }
}

/// Thirteen cities per metro, so node 10 exists in a binary tree
fn thirteen(base: f64) -> Vec<f64> {
    (0..13).map(|i| base + 100.0 * i as f64).collect()
}

fn build(config: SimulationConfig, descriptors: &[MetroDescriptor], routes: &[Route]) -> Simulation {
    let mut builder = NetworkBuilder::new();
    let networks = builder
        .build_metro_networks(descriptors, |n| TopologyKind::default().generate(n))
        .unwrap();
    let airport = builder.build_airport_network(routes);
    let metros = from_networks_to_populations(&networks, config.epidemic, &config.hub_policy).unwrap();
    Simulation::new(config, metros, airport).unwrap()
}

#[test]
fn test_two_city_movement_conserves_metro_total() {
    let mut graph = WeightedGraph::undirected();
    graph.add_edge(0, 1, 10.0);

    let params = EpidemicParams::default();
    let mut cities = vec![
        City::new("Lyon0".into(), 0, CompartmentState::susceptible(100.0), params),
        City::new("Lyon1".into(), 1, CompartmentState::susceptible(50.0), params),
    ];
    cities[0].set_connections(Connections::from([(1, 10.0)]));
    cities[1].set_connections(Connections::from([(0, 10.0)]));

    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    for city in cities.iter_mut() {
        compute_travelers(city, 0.1, &mut rng).unwrap();
    }
    apply_travelers(&graph, cities.as_mut_slice(), &mut rng).unwrap();

    let total: f64 = cities.iter().map(|c| c.compartment_state().total()).sum();
    assert_eq!(total, 150.0);
    for city in &cities {
        assert!(city.pending_travelers().is_none());
        assert_eq!(city.compartment_state().i, 0.0);
    }
}

#[test]
fn test_patient_zero_flips_one_unit() {
    let config = SimulationConfig {
        final_time: 10.0,
        hub_policy: HubPolicy::FixedIndex { index: 10 },
        seed_location: SeedLocation { metro: 346, city: 10 },
        ..Default::default()
    };
    let descriptors = vec![
        descriptor(346, "Toronto", thirteen(5000.0)),
        descriptor(82, "Ottawa", thirteen(3000.0)),
    ];
    let sim = build(config, &descriptors, &[]);

    let toronto = sim.metro(346).unwrap();
    for city in toronto.cities() {
        let initial = CompartmentState::susceptible(5000.0 + 100.0 * city.index as f64);
        let expected = if city.index == 10 {
            CompartmentState::new(initial.s - 1.0, 1.0, 0.0)
        } else {
            initial
        };
        assert_eq!(city.history()[0], expected, "{}", city.name);
        assert_eq!(*city.compartment_state(), expected);
    }
    for city in sim.metro(82).unwrap().cities() {
        assert_eq!(city.history()[0].i, 0.0);
    }
}

#[test]
fn test_gravity_weight_without_clamp() {
    let mut builder = NetworkBuilder::new();
    let networks = builder
        .build_metro_networks(&[descriptor(0, "Lille", vec![100.0, 50.0])], |n| {
            TopologyKind::Path.generate(n)
        })
        .unwrap();
    assert_eq!(networks[0].graph.weight(0, 1), Some(12.0));
    assert_eq!(networks[0].graph.weight(1, 0), Some(12.0));
    assert!(builder.report().clamped_edges.is_empty());
}

#[test]
fn test_underflowing_weight_is_clamped_and_reported() {
    let mut builder = NetworkBuilder::new();
    let networks = builder
        .build_metro_networks(&[descriptor(0, "Metz", vec![1.0, 1.0])], |n| {
            TopologyKind::Path.generate(n)
        })
        .unwrap();
    assert_eq!(networks[0].graph.weight(0, 1), Some(1.0));
    assert_eq!(builder.report().clamped_edges.len(), 1);
}

#[test]
fn test_integrator_matches_closed_form() {
    let params = EpidemicParams {
        infection_rate: 0.3,
        recovery_rate: 0.1,
    };
    let mut city = City::new("Gent0".into(), 0, CompartmentState::new(990.0, 10.0, 0.0), params);
    euler_step(&mut city, 0.1).unwrap();

    // dS = -0.3 * 990 * 10 / 1000 = -2.97, dR = 0.1 * 10 = 1
    let state = city.compartment_state();
    assert!((state.s - 989.703).abs() < 1e-9);
    assert!((state.i - 10.197).abs() < 1e-9);
    assert!((state.r - 0.1).abs() < 1e-9);
}

#[test]
fn test_integrator_surfaces_negative_state() {
    let params = EpidemicParams {
        infection_rate: 50.0,
        recovery_rate: 0.0,
    };
    let mut city = City::new("Brest0".into(), 0, CompartmentState::new(10.0, 90.0, 0.0), params);
    let result = euler_step(&mut city, 1.0);
    assert!(matches!(result, Err(SimError::InvalidPopulationState { .. })));
}

#[test]
fn test_full_run_spreads_between_metros() {
    let config = SimulationConfig {
        final_time: 60.0,
        seed: 99,
        hub_policy: HubPolicy::FixedIndex { index: 10 },
        seed_location: SeedLocation { metro: 0, city: 10 },
        ..Default::default()
    };
    let descriptors = vec![
        descriptor(0, "Gdansk", thirteen(20000.0)),
        descriptor(1, "Sopot", thirteen(15000.0)),
    ];
    let routes = [
        Route { origin: 0, destination: 1, raw_weight: 3.0 },
        Route { origin: 1, destination: 0, raw_weight: 3.0 },
    ];
    let mut sim = build(config, &descriptors, &routes);
    let initial: f64 = sim.metros().map(|m| m.total_population()).sum();

    sim.run().unwrap();

    let steps = sim.step_number();
    assert_eq!(steps, 600);
    for metro in sim.metros() {
        for city in metro.cities() {
            assert_eq!(city.history().len(), steps + 1);
        }
        assert_eq!(metro.hub_travel_log().len(), steps);
    }

    let total: f64 = sim.metros().map(|m| m.total_population()).sum();
    assert!((total - initial).abs() < 1e-6 * initial);

    // Sixty days at these rates always carries the outbreak out of the seed tree
    let sopot_ever_infected: f64 = sim
        .metro(1)
        .unwrap()
        .cities()
        .iter()
        .map(|c| c.compartment_state().i + c.compartment_state().r)
        .sum();
    assert!(sopot_ever_infected > 0.0);
}

#[test]
fn test_same_seed_same_history() {
    let config = SimulationConfig {
        final_time: 5.0,
        seed: 3,
        hub_policy: HubPolicy::LargestPopulation,
        seed_location: SeedLocation { metro: 0, city: 4 },
        ..Default::default()
    };
    let descriptors = vec![
        descriptor(0, "Riga", thirteen(8000.0)),
        descriptor(1, "Tartu", thirteen(4000.0)),
    ];
    let routes = [
        Route { origin: 0, destination: 1, raw_weight: 2.0 },
        Route { origin: 1, destination: 0, raw_weight: 2.0 },
    ];

    let mut first = build(config.clone(), &descriptors, &routes);
    let mut second = build(config, &descriptors, &routes);
    first.run().unwrap();
    second.run().unwrap();

    for (a, b) in first.metros().zip(second.metros()) {
        assert_eq!(a.aggregate_history(), b.aggregate_history());
        assert_eq!(a.hub_travel_log(), b.hub_travel_log());
    }
}
