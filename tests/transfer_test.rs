use contest_seating::domain::model::{derive_level, StudentId, TeamId};
use contest_seating::{Level, Roster, SeatingError, SeatingRules, Student, Team, TransferEngine};
use proptest::prelude::*;

fn build_roster(levels_per_team: &[Vec<bool>], capacity: usize) -> Roster {
    let rules = SeatingRules::default();
    let teams = levels_per_team
        .iter()
        .enumerate()
        .map(|(t, members)| {
            let members = members
                .iter()
                .enumerate()
                .map(|(m, is_a)| {
                    Student::new(
                        format!("t{}-s{}", t, m),
                        format!("Student {}-{}", t, m),
                        if *is_a { Level::A } else { Level::B },
                    )
                })
                .collect();
            Team::with_members(
                format!("t{}", t),
                format!("Team {}", t),
                capacity,
                members,
                rules.level_a_min_members,
            )
            .unwrap()
        })
        .collect();
    Roster::new(teams).unwrap()
}

#[test]
fn test_transfer_keeps_other_teams_and_order() {
    let roster = build_roster(
        &[vec![true, true], vec![false], vec![true, false, true]],
        4,
    );
    let engine = TransferEngine::new(SeatingRules::default()).unwrap();

    let after = engine
        .transfer_by_id(
            &StudentId::from("t0-s0"),
            &TeamId::from("t0"),
            &TeamId::from("t2"),
            &roster,
        )
        .unwrap();

    let ids: Vec<&str> = after.teams().map(|t| t.id().as_str()).collect();
    assert_eq!(ids, vec!["t0", "t1", "t2"]);
    assert_eq!(after.team(&"t1".into()), roster.team(&"t1".into()));
    assert_eq!(after.team_of(&"t0-s0".into()).unwrap().id().as_str(), "t2");
}

#[test]
fn test_mixed_team_stays_level_b_after_gaining_a() {
    let roster = build_roster(&[vec![true, true, true], vec![false, true]], 4);
    let engine = TransferEngine::new(SeatingRules::default()).unwrap();

    let after = engine
        .transfer_by_id(&"t0-s0".into(), &"t0".into(), &"t1".into(), &roster)
        .unwrap();

    assert_eq!(after.team(&"t1".into()).unwrap().level(), Level::B);
    assert_eq!(after.team(&"t0".into()).unwrap().level(), Level::A);
}

#[test]
fn test_removing_the_only_b_member_promotes_source() {
    let roster = build_roster(&[vec![true, false, true], vec![]], 4);
    let engine = TransferEngine::new(SeatingRules::default()).unwrap();

    let after = engine
        .transfer_by_id(&"t0-s1".into(), &"t0".into(), &"t1".into(), &roster)
        .unwrap();

    assert_eq!(after.team(&"t0".into()).unwrap().level(), Level::A);
    assert_eq!(after.team(&"t1".into()).unwrap().level(), Level::B);
}

#[test]
fn test_single_member_rules_rejected_before_any_transfer() {
    // 門檻為 0/1 時，被清空或只剩一人的隊伍會變成 A 級
    let rules = SeatingRules {
        level_a_min_members: 1,
        source_level_a_min_members: 0,
        ..SeatingRules::default()
    };
    let err = TransferEngine::new(rules).unwrap_err();
    assert!(matches!(err, SeatingError::InvalidConfigValueError { .. }));

    let roster = build_roster(&[vec![true], vec![]], 4);
    let engine = TransferEngine::new(SeatingRules::default()).unwrap();
    let after = engine
        .transfer_by_id(&"t0-s0".into(), &"t0".into(), &"t1".into(), &roster)
        .unwrap();
    assert_eq!(after.team(&"t0".into()).unwrap().level(), Level::B);
    assert_eq!(after.team(&"t1".into()).unwrap().level(), Level::B);
}

#[test]
fn test_capacity_error_carries_team() {
    let roster = build_roster(&[vec![true], vec![true, true]], 2);
    let engine = TransferEngine::new(SeatingRules::default()).unwrap();

    match engine.transfer_by_id(&"t0-s0".into(), &"t0".into(), &"t1".into(), &roster) {
        Err(SeatingError::CapacityExceeded { team_id, capacity }) => {
            assert_eq!(team_id, "t1");
            assert_eq!(capacity, 2);
        }
        other => panic!("expected CapacityExceeded, got {:?}", other),
    }
}

fn teams_strategy() -> impl Strategy<Value = Vec<Vec<bool>>> {
    prop::collection::vec(prop::collection::vec(any::<bool>(), 0..=4), 2..6)
}

proptest! {
    /// A valid transfer moves exactly one member and rederives both levels.
    #[test]
    fn prop_transfer_moves_one_member(
        teams in teams_strategy(),
        from_pick in any::<prop::sample::Index>(),
        to_pick in any::<prop::sample::Index>(),
        member_pick in any::<prop::sample::Index>(),
    ) {
        let roster = build_roster(&teams, 5);
        let from = from_pick.index(teams.len());
        let to = to_pick.index(teams.len());
        prop_assume!(from != to);
        prop_assume!(!teams[from].is_empty());

        let member = member_pick.index(teams[from].len());
        let from_id = TeamId::from(format!("t{}", from));
        let to_id = TeamId::from(format!("t{}", to));
        let student_id = StudentId::from(format!("t{}-s{}", from, member));

        let engine = TransferEngine::new(SeatingRules::default()).unwrap();
        let after = engine.transfer_by_id(&student_id, &from_id, &to_id, &roster).unwrap();

        let before_from = roster.team(&from_id).unwrap();
        let before_to = roster.team(&to_id).unwrap();
        let after_from = after.team(&from_id).unwrap();
        let after_to = after.team(&to_id).unwrap();

        prop_assert_eq!(after_from.len(), before_from.len() - 1);
        prop_assert_eq!(after_to.len(), before_to.len() + 1);
        prop_assert!(after_to.contains(&student_id));
        prop_assert!(!after_from.contains(&student_id));

        for team in [after_from, after_to] {
            let all_a = team.members().iter().all(|s| s.level == Level::A);
            let expected = if team.len() > 1 && all_a { Level::A } else { Level::B };
            prop_assert_eq!(team.level(), expected);
            prop_assert_eq!(team.level(), derive_level(team.members(), 2));
        }
        prop_assert!(after.check_invariants(&SeatingRules::default()).is_ok());
    }
}
