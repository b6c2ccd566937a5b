mod common;

use common::SimulationBuilder;

#[test]
fn test_same_seed_same_history() {
    let mut sim1 = SimulationBuilder::new().with_seed(12345).with_end_time(25.0).build_aggregate(80);
    let mut sim2 = SimulationBuilder::new().with_seed(12345).with_end_time(25.0).build_aggregate(80);

    let s1 = sim1.run().unwrap();
    let s2 = sim2.run().unwrap();

    assert_eq!(s1.steps, s2.steps, "Step records should match");
    assert_eq!(s1.config_fingerprint, s2.config_fingerprint);
    assert_eq!(sim1.population(), sim2.population());
    for (a, b) in sim1.agents().iter().zip(sim2.agents()) {
        assert_eq!(a.id(), b.id());
        assert_eq!(a.state, b.state);
        assert_eq!(a.body.location, b.body.location, "Locations should match for {}", a.id());
    }
    assert_eq!(sim1.network.edge_count(), sim2.network.edge_count());
}

#[test]
fn test_different_seed_different_aggregate() {
    let sim1 = SimulationBuilder::new().with_seed(1).build_aggregate(50);
    let sim2 = SimulationBuilder::new().with_seed(2).build_aggregate(50);

    let differs = sim1
        .agents()
        .iter()
        .zip(sim2.agents())
        .any(|(a, b)| a.body.location != b.body.location);
    assert!(differs);
}
