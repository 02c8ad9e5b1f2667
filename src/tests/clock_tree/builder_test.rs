#[cfg(test)]
pub mod builder_tests {
    use crate::clock_tree::{ClockSpec, ClockTreeBuilder, LockClass};
    use crate::errors::ClockError;

    #[test]
    fn test_relations_are_resolved_by_name() {
        let tree = ClockTreeBuilder::new()
            .clock(ClockSpec::new("leaf").parent("root").bus_parent("bus"))
            .clock(ClockSpec::new("root").rate(26_000_000))
            .clock(ClockSpec::new("bus"))
            .build()
            .unwrap();

        let leaf = tree.find("leaf").unwrap();
        assert_eq!(tree.parent(leaf), tree.find("root"));
        assert_eq!(tree.bus_parent(leaf), tree.find("bus"));
    }

    #[test]
    fn test_unknown_parent_is_rejected() {
        let result = ClockTreeBuilder::new()
            .clock(ClockSpec::new("leaf").parent("nowhere"))
            .build();
        assert!(matches!(result, Err(ClockError::InvalidArgument { .. })));
    }

    #[test]
    fn test_unknown_lock_is_rejected() {
        let result = ClockTreeBuilder::new()
            .clock(ClockSpec::new("leaf").lock("nowhere"))
            .build();
        assert!(matches!(result, Err(ClockError::InvalidArgument { .. })));
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let result = ClockTreeBuilder::new()
            .clock(ClockSpec::new("a"))
            .clock(ClockSpec::new("a"))
            .build();
        assert!(matches!(result, Err(ClockError::InvalidArgument { .. })));
    }

    #[test]
    fn test_cycle_through_bus_parent_is_rejected() {
        let result = ClockTreeBuilder::new()
            .clock(ClockSpec::new("a").parent("b"))
            .clock(ClockSpec::new("b").bus_parent("c"))
            .clock(ClockSpec::new("c").parent("a"))
            .build();
        assert!(matches!(result, Err(ClockError::InvalidArgument { .. })));
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let result = ClockTreeBuilder::new()
            .clock(ClockSpec::new("leaf").parent("mid").bus_parent("bus"))
            .clock(ClockSpec::new("mid").parent("root"))
            .clock(ClockSpec::new("bus").parent("root"))
            .clock(ClockSpec::new("root"))
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_atomic_clock_cannot_depend_on_sleeping_lock() {
        let result = ClockTreeBuilder::new()
            .lock("opp100", LockClass::Sleeping)
            .clock(ClockSpec::new("leaf").parent("pll"))
            .clock(ClockSpec::new("pll").lock("opp100"))
            .build();
        assert!(matches!(result, Err(ClockError::InvalidArgument { .. })));
    }

    #[test]
    fn test_sleeping_clock_can_depend_on_atomic_lock() {
        let result = ClockTreeBuilder::new()
            .lock("opp100", LockClass::Sleeping)
            .clock(ClockSpec::new("leaf").lock("opp100").parent("pll"))
            .clock(ClockSpec::new("pll"))
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_lock_returning_up_the_chain_is_rejected() {
        let result = ClockTreeBuilder::new()
            .lock("x", LockClass::Atomic)
            .lock("y", LockClass::Atomic)
            .clock(ClockSpec::new("a").lock("x").parent("b"))
            .clock(ClockSpec::new("b").lock("y").parent("c"))
            .clock(ClockSpec::new("c").lock("x"))
            .build();
        assert!(matches!(result, Err(ClockError::InvalidArgument { .. })));
    }

    #[test]
    fn test_fallback_returning_through_bus_parent_is_rejected() {
        let result = ClockTreeBuilder::new()
            .lock("y", LockClass::Atomic)
            .clock(ClockSpec::new("a").bus_parent("b"))
            .clock(ClockSpec::new("b").lock("y").parent("c"))
            .clock(ClockSpec::new("c"))
            .build();
        assert!(matches!(result, Err(ClockError::InvalidArgument { .. })));
    }

    #[test]
    fn test_lock_run_and_distinct_locks_are_accepted() {
        let result = ClockTreeBuilder::new()
            .lock("x", LockClass::Atomic)
            .lock("y", LockClass::Atomic)
            .clock(ClockSpec::new("a").lock("x").parent("b"))
            .clock(ClockSpec::new("b").lock("x").parent("c"))
            .clock(ClockSpec::new("c").lock("y").parent("d"))
            .clock(ClockSpec::new("d"))
            .build();
        assert!(result.is_ok());
    }
}
