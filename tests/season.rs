use chrono::{Days, NaiveDate};
use harvestsim::{
    config::BalanceConfig,
    economy::PlayerAction,
    farm::{Crop, CropKind, Farm},
    weather::WeatherData,
    world::{ActionOutcome, World},
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn corn_with_ideal_factors_matures_in_a_season() {
    let mut crop = Crop::new(CropKind::Corn);
    for _ in 0..80 {
        crop.grow(1.0, 1.0);
    }

    assert!(crop.is_mature());
    assert_eq!(crop.days_since_planted, 80);
    let expected = 8.0 * crop.growth_stage * crop.health;
    let yielded = crop.get_yield(1.0, 1.0);
    assert!((yielded - expected).abs() < 1e-9);
    assert!(yielded <= 8.0 * crop.health);
}

#[test]
fn kept_topped_up_corn_is_harvestable() {
    let mut farm = Farm::new(1, 1);
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let start = NaiveDate::from_ymd_opt(2024, 4, 1).expect("valid date");
    let weather = WeatherData::new(24.0, 0.0, 60.0);
    assert!(farm.plant_crop(0, 0, CropKind::Corn));

    for day in 0..80 {
        farm.water_tile(0, 0);
        farm.fertilize_tile(0, 0);
        let date = start.checked_add_days(Days::new(day)).expect("date in range");
        farm.update(date, &weather, &mut rng);
    }

    let crop = farm
        .get_tile(0, 0)
        .and_then(|tile| tile.crop.as_ref())
        .expect("crop still planted");
    assert!(crop.is_mature());
    let health = crop.health;
    let amount = farm.harvest_crop(0, 0);
    assert!(amount > 0.0);
    assert!(amount <= 8.0 * health + 1e-9);
    assert_eq!(farm.total_harvested, 1);
}

#[test]
fn running_out_of_money_stops_spending() {
    let mut config = BalanceConfig::default();
    config.economy.starting_money = 30.0;
    let start = NaiveDate::from_ymd_opt(2024, 4, 1).expect("valid date");
    let mut world = World::new(4, 1, start, config);

    let outcomes: Vec<ActionOutcome> = (0..4)
        .map(|x| world.perform(PlayerAction::Plant(CropKind::Corn), x, 0))
        .collect();

    assert_eq!(outcomes.iter().filter(|o| o.succeeded()).count(), 3);
    assert!(matches!(
        outcomes[3],
        ActionOutcome::InsufficientFunds { cost, money } if cost == 8.0 && money == 6.0
    ));
    assert_eq!(world.farm.total_planted, 3);
    assert_eq!(world.ledger.money, 6.0);
}
