use chrono::NaiveDate;
use harvestsim::{
    engine::{EngineBuilder, EngineSettings, System, SystemContext},
    rng::SystemRng,
    scenario::ScenarioLoader,
    BalanceConfig, World,
};

#[test]
fn engine_runs_hook_each_day() {
    let loader = ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"));
    let scenario = loader
        .load("scenarios/spring_plot.yaml")
        .expect("scenario should load");
    let mut world = scenario.build_world();
    let mut engine = scenario.build_engine(None);

    let mut days = Vec::new();
    let mut planted = Vec::new();
    let summaries = engine
        .run_with_hook(&mut world, 6, |snapshot| {
            days.push(snapshot.day);
            planted.push(snapshot.tiles.iter().filter(|t| t.crop.is_some()).count());
        })
        .expect("run succeeds");

    assert_eq!(summaries.len(), 6);
    assert_eq!(days, vec![1, 2, 3, 4, 5, 6]);
    assert!(planted.iter().all(|count| *count == 9));
    assert_eq!(summaries[0].day, 0);
    assert_eq!(summaries[0].date, scenario.start_date);
    // 9 plantings, 9 waterings and 9 fertilizer doses on day 0.
    assert_eq!(summaries[0].actions.len(), 27);
    assert!(summaries[0].actions.iter().all(|a| a.outcome.succeeded()));
}

struct FailOnDay(u64);

impl System for FailOnDay {
    fn name(&self) -> &str {
        "fail"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        _world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> anyhow::Result<()> {
        if ctx.day == self.0 {
            anyhow::bail!("stopped on day {}", ctx.day);
        }
        Ok(())
    }
}

#[test]
fn unbounded_run_stops_at_the_first_system_error() {
    let start = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    let mut world = World::new(1, 1, start, BalanceConfig::default());
    let mut engine = EngineBuilder::new(EngineSettings {
        scenario_name: "fail".into(),
        seed: 1,
    })
    .with_system(FailOnDay(3))
    .build();

    let mut hooked = 0;
    let err = engine
        .run_with_hook(&mut world, u64::MAX, |_| hooked += 1)
        .unwrap_err();
    assert!(err.to_string().contains("day 3"));
    assert_eq!(hooked, 3);
    assert_eq!(world.day(), 3);
}
