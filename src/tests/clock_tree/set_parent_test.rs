#[cfg(test)]
pub mod set_parent_tests {
    use crate::clock_tree::{ClockSpec, ClockTree, ClockTreeBuilder};
    use crate::errors::{ClockError, EIO};
    use crate::tests::helper::{count, event_log, id, CountingOps, EventLog};
    use std::sync::Arc;

    /// A mux currently fed by "pll_a", able to switch to "pll_b".
    fn mux_tree(mux_ops: Arc<CountingOps>, pll_b: Arc<CountingOps>, log: &EventLog) -> ClockTree {
        ClockTreeBuilder::new()
            .clock(
                ClockSpec::new("mux")
                    .parent("pll_a")
                    .parents(&["pll_a", "pll_b"])
                    .ops(mux_ops),
            )
            .clock(ClockSpec::new("pll_a").rate(26_000_000).ops(CountingOps::logging(log)))
            .clock(ClockSpec::new("pll_b").rate(38_400_000).ops(pll_b))
            .clock(ClockSpec::new("stray").rate(1))
            .build()
            .unwrap()
    }

    #[test]
    fn test_parent_outside_allowed_list_is_rejected() {
        let log = event_log();
        let tree = mux_tree(CountingOps::new(), CountingOps::new(), &log);
        let mux = id(&tree, "mux");
        tree.enable(mux).unwrap();

        let result = tree.set_parent(mux, id(&tree, "stray"));

        assert!(matches!(result, Err(ClockError::InvalidArgument { .. })));
        assert_eq!(tree.parent(mux), tree.find("pll_a"));
        assert_eq!(count(&tree, "mux"), 1);
        assert_eq!(count(&tree, "pll_a"), 1);
        assert_eq!(count(&tree, "stray"), 0);
    }

    #[test]
    fn test_clock_without_parent_list_cannot_reparent() {
        let tree = ClockTreeBuilder::new()
            .clock(ClockSpec::new("leaf").parent("a"))
            .clock(ClockSpec::new("a"))
            .build()
            .unwrap();

        assert!(matches!(
            tree.set_parent(id(&tree, "leaf"), id(&tree, "a")),
            Err(ClockError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_disabled_clock_switches_reference_only() {
        let log = event_log();
        let pll_b = CountingOps::new();
        let tree = mux_tree(CountingOps::new(), pll_b.clone(), &log);
        let mux = id(&tree, "mux");

        tree.set_parent(mux, id(&tree, "pll_b")).unwrap();

        assert_eq!(tree.parent(mux), tree.find("pll_b"));
        assert_eq!(pll_b.enables(), 0);
        assert_eq!(tree.get_rate(mux), 38_400_000);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_enabled_clock_moves_its_reference() {
        let log = event_log();
        let tree = ClockTreeBuilder::new()
            .clock(ClockSpec::new("mux").parent("pll_a").parents(&["pll_a", "pll_b"]))
            .clock(ClockSpec::new("pll_a").ops(CountingOps::logging(&log)))
            .clock(ClockSpec::new("pll_b").ops(CountingOps::logging(&log)))
            .build()
            .unwrap();
        let mux = id(&tree, "mux");
        tree.enable(mux).unwrap();

        tree.set_parent(mux, id(&tree, "pll_b")).unwrap();

        assert_eq!(tree.parent(mux), tree.find("pll_b"));
        assert_eq!(count(&tree, "mux"), 1);
        assert_eq!(count(&tree, "pll_a"), 0);
        assert_eq!(count(&tree, "pll_b"), 1);
        assert_eq!(
            *log.lock(),
            vec!["pll_a enable", "pll_b enable", "pll_a disable"]
        );

        // The new parent is released together with the clock.
        tree.disable(mux).unwrap();
        assert_eq!(count(&tree, "pll_b"), 0);
    }

    #[test]
    fn test_failed_new_parent_leaves_state_unchanged() {
        let log = event_log();
        let pll_b = CountingOps::failing();
        let tree = mux_tree(CountingOps::new(), pll_b.clone(), &log);
        let mux = id(&tree, "mux");
        tree.enable(mux).unwrap();

        let result = tree.set_parent(mux, id(&tree, "pll_b"));

        assert_eq!(result, Err(ClockError::HardwareFailure { code: EIO }));
        assert_eq!(tree.parent(mux), tree.find("pll_a"));
        assert_eq!(count(&tree, "pll_a"), 1);
        assert_eq!(count(&tree, "pll_b"), 0);
        assert_eq!(pll_b.enables(), 1);
    }

    #[test]
    fn test_custom_reparenting_replaces_power_switch() {
        let log = event_log();
        let pll_b = CountingOps::new();
        let tree = mux_tree(CountingOps::reparenting(Ok(())), pll_b.clone(), &log);
        let mux = id(&tree, "mux");
        tree.enable(mux).unwrap();

        tree.set_parent(mux, id(&tree, "pll_b")).unwrap();

        assert_eq!(tree.parent(mux), tree.find("pll_b"));
        assert_eq!(pll_b.enables(), 0);
        assert_eq!(count(&tree, "pll_a"), 1);
    }

    #[test]
    fn test_failed_custom_reparenting_keeps_parent() {
        let log = event_log();
        let tree = mux_tree(
            CountingOps::reparenting(Err(ClockError::hardware(EIO))),
            CountingOps::new(),
            &log,
        );
        let mux = id(&tree, "mux");

        let result = tree.set_parent(mux, id(&tree, "pll_b"));

        assert_eq!(result, Err(ClockError::HardwareFailure { code: EIO }));
        assert_eq!(tree.parent(mux), tree.find("pll_a"));
    }
}
