//! Turn-cycle scenarios: retreats, adjustments, and whole game years.

use entente::{
    Map, MovementTurn, OrderSpec, Power, Province, ResultTag, Season, SubmitError, Turn,
    UnitType,
};

use Power::*;
use Province::*;
use UnitType::{Army, Fleet};

/// Two dislodgements in one turn: Munich (by France) and Bohemia (by
/// Austria), leaving both victims with Silesia among their retreat options.
fn double_dislodgement() -> entente::RetreatTurn {
    let mut turn = MovementTurn::new(Map::standard(), Season::Spring, 1901);
    turn.add_unit(Germany, Army, Mun).unwrap();
    turn.add_unit(Russia, Army, Boh).unwrap();
    turn.add_unit(France, Army, Bur).unwrap();
    turn.add_unit(France, Army, Ruh).unwrap();
    turn.add_unit(Austria, Army, Gal).unwrap();
    turn.add_unit(Austria, Army, Vie).unwrap();
    turn.submit_orders(
        France,
        &[
            OrderSpec::move_to(Bur, Mun),
            OrderSpec::support(Ruh, Bur),
        ],
    )
    .unwrap();
    turn.submit_orders(
        Austria,
        &[
            OrderSpec::move_to(Gal, Boh),
            OrderSpec::support(Vie, Gal),
        ],
    )
    .unwrap();
    match turn.next_turn().unwrap() {
        Turn::Retreat(r) => r,
        _ => panic!("expected a retreat turn"),
    }
}

#[test]
fn clashing_retreats_all_fail() {
    let mut retreat = double_dislodgement();
    assert_eq!(retreat.pieces_dislodged().count(), 2);

    retreat
        .submit_orders(Germany, &[OrderSpec::retreat(Mun, Sil)])
        .unwrap();
    retreat
        .submit_orders(Russia, &[OrderSpec::retreat(Boh, Sil)])
        .unwrap();

    retreat.resolve();
    assert!(retreat
        .piece_dislodged_at(Mun)
        .unwrap()
        .order()
        .unwrap()
        .results()
        .contains(ResultTag::Bounced));
    assert!(retreat
        .piece_dislodged_at(Boh)
        .unwrap()
        .order()
        .unwrap()
        .results()
        .contains(ResultTag::Bounced));

    let next = retreat.next_turn().unwrap();
    let next = next.as_movement().unwrap();
    assert_eq!(next.season(), Season::Autumn);
    // Neither piece made it; both are off the board.
    assert!(next.piece_at(Sil).is_none());
    assert_eq!(next.power(Germany).piece_count(), 0);
    assert_eq!(next.power(Russia).piece_count(), 0);
}

#[test]
fn distinct_retreats_both_succeed() {
    let mut retreat = double_dislodgement();
    retreat
        .submit_orders(Germany, &[OrderSpec::retreat(Mun, Ber)])
        .unwrap();
    retreat
        .submit_orders(Russia, &[OrderSpec::retreat(Boh, Sil)])
        .unwrap();

    let next = retreat.next_turn().unwrap();
    let next = next.as_movement().unwrap();
    assert_eq!(next.piece_at(Ber).unwrap().owner, Germany);
    assert_eq!(next.piece_at(Sil).unwrap().owner, Russia);
}

#[test]
fn unordered_dislodged_piece_disbands() {
    let retreat = double_dislodgement();
    let next = retreat.next_turn().unwrap();
    let next = next.as_movement().unwrap();
    assert_eq!(next.power(Germany).piece_count(), 0);
    assert_eq!(next.power(Russia).piece_count(), 0);
    // The victors stand where they conquered.
    assert_eq!(next.piece_at(Mun).unwrap().owner, France);
    assert_eq!(next.piece_at(Boh).unwrap().owner, Austria);
}

#[test]
fn retreat_to_occupied_province_is_rejected() {
    let mut retreat = double_dislodgement();
    // Bohemia is occupied by the Austrian attacker now.
    let err = retreat
        .submit_orders(Germany, &[OrderSpec::retreat(Mun, Boh)])
        .unwrap_err();
    assert!(matches!(err, SubmitError::Rejected(_)));
}

#[test]
fn retreat_template_lists_options() {
    let retreat = double_dislodgement();
    let template = retreat.orders_template(Germany);
    assert!(template.starts_with("A mun - "));
    assert!(template.contains("sil"));
    assert!(!template.contains("bur"), "no retreat towards the attacker");
}

#[test]
fn capture_build_and_piece_identity_across_a_year() {
    let opening = MovementTurn::opening(Map::standard());
    let sev_fleet = opening.piece_at(Sev).unwrap().id;

    let mut spring = opening;
    spring
        .submit_orders(Russia, &[OrderSpec::move_to(Sev, Rum)])
        .unwrap();
    let autumn = spring.next_turn().unwrap();
    assert_eq!(autumn.year(), 1901);
    assert_eq!(autumn.season_name(), "Autumn");

    let winter = autumn.next_turn().unwrap();
    let adjustment = match winter {
        Turn::Adjustment(a) => a,
        other => panic!("expected adjustment, got {}", other),
    };
    assert_eq!(adjustment.year(), 1901);
    assert_eq!(adjustment.owner(Rum), Some(Russia));
    assert_eq!(adjustment.builds_owed(Russia), 1);
    assert_eq!(adjustment.disbands_owed(Russia), 0);
    for power in [Austria, England, France, Germany, Italy, Turkey] {
        assert_eq!(adjustment.builds_owed(power), 0, "{} owes nothing", power);
    }
    assert_eq!(adjustment.orders_template(Russia), "build");

    let mut adjustment = adjustment;
    adjustment
        .submit_orders(Russia, &[OrderSpec::build(Fleet, Sev)])
        .unwrap();
    let spring2 = adjustment.next_turn().unwrap();
    let spring2 = spring2.as_movement().unwrap();
    assert_eq!(spring2.year(), 1902);
    assert_eq!(spring2.season(), Season::Spring);
    assert_eq!(spring2.power(Russia).piece_count(), 5);
    // The fleet that sailed to Rumania is the same physical unit.
    assert_eq!(spring2.piece_at(Rum).unwrap().id, sev_fleet);
    assert_eq!(spring2.piece_at(Sev).unwrap().unit_type, Fleet);
    assert_ne!(spring2.piece_at(Sev).unwrap().id, sev_fleet);
}

/// Runs the opening to an adjustment turn where Russia is owed one build.
fn russia_owed_one_build() -> entente::AdjustmentTurn {
    let mut spring = MovementTurn::opening(Map::standard());
    spring
        .submit_orders(Russia, &[OrderSpec::move_to(Sev, Rum)])
        .unwrap();
    let autumn = spring.next_turn().unwrap();
    match autumn.next_turn().unwrap() {
        Turn::Adjustment(a) => a,
        _ => panic!("expected adjustment"),
    }
}

#[test]
fn build_outside_a_home_centre_is_rejected() {
    let mut adjustment = russia_owed_one_build();
    // Rumania is owned but not a Russian home centre.
    let err = adjustment
        .submit_orders(Russia, &[OrderSpec::build(Army, Rum)])
        .unwrap_err();
    assert!(matches!(err, SubmitError::Rejected(_)));
}

#[test]
fn build_in_an_occupied_centre_is_rejected() {
    let mut adjustment = russia_owed_one_build();
    let err = adjustment
        .submit_orders(Russia, &[OrderSpec::build(Army, Mos)])
        .unwrap_err();
    assert!(matches!(err, SubmitError::Rejected(_)));
}

#[test]
fn builds_beyond_the_owed_count_are_rejected() {
    let mut adjustment = russia_owed_one_build();
    let err = adjustment
        .submit_orders(
            Russia,
            &[OrderSpec::waive(), OrderSpec::build(Fleet, Sev)],
        )
        .unwrap_err();
    assert!(matches!(err, SubmitError::Rejected(_)));
}

#[test]
fn waived_build_leaves_the_count_alone() {
    let mut adjustment = russia_owed_one_build();
    adjustment.submit_orders(Russia, &[OrderSpec::waive()]).unwrap();
    let spring = adjustment.next_turn().unwrap();
    let spring = spring.as_movement().unwrap();
    assert_eq!(spring.power(Russia).piece_count(), 4);
}

#[test]
fn unsubmitted_builds_default_to_waives() {
    let adjustment = russia_owed_one_build();
    let spring = adjustment.next_turn().unwrap();
    let spring = spring.as_movement().unwrap();
    assert_eq!(spring.power(Russia).piece_count(), 4);
    assert_eq!(spring.year(), 1902);
}

#[test]
fn default_disband_picks_the_farthest_piece() {
    let mut autumn = MovementTurn::new(Map::standard(), Season::Autumn, 1901);
    autumn.add_unit(Austria, Army, Vie).unwrap();
    autumn.add_unit(Austria, Army, Ukr).unwrap();
    autumn.claim(Austria, Vie);

    let adjustment = match autumn.next_turn().unwrap() {
        Turn::Adjustment(a) => a,
        _ => panic!("expected adjustment"),
    };
    assert_eq!(adjustment.disbands_owed(Austria), 1);
    assert_eq!(adjustment.orders_template(Austria), "disband");

    let spring = adjustment.next_turn().unwrap();
    let spring = spring.as_movement().unwrap();
    // Ukraine is far from every Austrian home centre; Vienna sits on one.
    assert!(spring.piece_at(Vie).is_some());
    assert!(spring.piece_at(Ukr).is_none());
    assert_eq!(spring.power(Austria).piece_count(), 1);
}

#[test]
fn explicit_disband_overrides_the_default() {
    let mut autumn = MovementTurn::new(Map::standard(), Season::Autumn, 1901);
    autumn.add_unit(Austria, Army, Vie).unwrap();
    autumn.add_unit(Austria, Army, Ukr).unwrap();
    autumn.claim(Austria, Vie);

    let mut adjustment = match autumn.next_turn().unwrap() {
        Turn::Adjustment(a) => a,
        _ => panic!("expected adjustment"),
    };
    adjustment
        .submit_orders(Austria, &[OrderSpec::disband(Vie)])
        .unwrap();
    let spring = adjustment.next_turn().unwrap();
    let spring = spring.as_movement().unwrap();
    assert!(spring.piece_at(Vie).is_none());
    assert!(spring.piece_at(Ukr).is_some());
}

#[test]
fn a_power_with_no_pieces_is_eliminated() {
    let mut spring = MovementTurn::new(Map::standard(), Season::Spring, 1901);
    spring.add_unit(Austria, Army, Vie).unwrap();
    spring.claim(Austria, Vie);
    spring.add_unit(France, Army, Tyr).unwrap();
    spring.add_unit(France, Army, Boh).unwrap();
    spring.claim(France, Par);
    spring.claim(France, Mar);
    spring
        .submit_orders(
            France,
            &[
                OrderSpec::move_to(Tyr, Vie),
                OrderSpec::support(Boh, Tyr),
            ],
        )
        .unwrap();

    let retreat = match spring.next_turn().unwrap() {
        Turn::Retreat(r) => r,
        _ => panic!("expected retreat"),
    };
    // Austria has nowhere sensible to go and submits nothing: disband.
    let autumn = retreat.next_turn().unwrap();
    {
        let autumn = autumn.as_movement().unwrap();
        assert_eq!(autumn.power(Austria).piece_count(), 0);
        // The province stays on Austria's books until a turn starts with
        // the power holding no pieces at all.
        assert_eq!(autumn.owner(Vie), Some(Austria));
    }

    let winter = autumn.next_turn().unwrap();
    let adjustment = match winter {
        Turn::Adjustment(a) => a,
        other => panic!("expected adjustment, got {}", other),
    };
    assert_eq!(adjustment.owner(Vie), Some(France));
    assert_eq!(adjustment.builds_owed(France), 1);
    assert_eq!(adjustment.power(Austria).provinces().count(), 0);
}

#[test]
fn unsubmitted_powers_shrink_as_orders_arrive() {
    let mut turn = Turn::Movement(MovementTurn::opening(Map::standard()));
    assert_eq!(turn.unsubmitted_powers().len(), 7);
    turn.submit_orders(Russia, &[OrderSpec::move_to(Sev, Rum)]).unwrap();
    let waiting = turn.unsubmitted_powers();
    assert_eq!(waiting.len(), 6);
    assert!(!waiting.contains(&Russia));
    assert_eq!(turn.to_string(), "Spring 1901 Movement");
}

#[test]
fn order_specs_round_trip_through_json() {
    let specs = vec![
        OrderSpec::move_to(Sev, Rum),
        OrderSpec::convoyed_move(Lon, [Nth], Nwy),
        OrderSpec::support(Boh, Tyr),
        OrderSpec::build(Fleet, Sev),
        OrderSpec::waive(),
    ];
    let json = serde_json::to_string(&specs).unwrap();
    let back: Vec<OrderSpec> = serde_json::from_str(&json).unwrap();
    assert_eq!(specs, back);
}
