#[cfg(test)]
pub mod init_tests {
    use crate::errors::{ClockError, EIO};
    use crate::hardware::SocFamily;
    use crate::model_objects::board::{read_json_board, BoardDescription};
    use crate::platform::{ClockPlatform, SMP_TWD};
    use crate::simulation::SimulatedHardware;
    use crate::tests::helper::{count, id};
    use test_case::test_case;

    const BOARD: &str = "samples/json/boards/mop500.json";
    const PRCC1: usize = 0x8012_F000;

    fn platform(simulated: &SimulatedHardware) -> ClockPlatform {
        ClockPlatform::new(read_json_board(BOARD).unwrap(), simulated.hardware())
    }

    #[test]
    fn test_unknown_soc_is_fatal() {
        let simulated = SimulatedHardware::new();
        let platform = platform(&simulated);

        let result = platform.init(&None::<SocFamily>);

        assert!(matches!(
            result,
            Err(ClockError::HardwareFailure { code: EIO })
        ));
        // A failed attempt does not count as initialization.
        assert!(platform.init(&Some(SocFamily::U8500)).is_ok());
    }

    #[test]
    fn test_second_init_is_rejected() {
        let simulated = SimulatedHardware::new();
        let platform = platform(&simulated);
        platform.init(&Some(SocFamily::U8500)).unwrap();

        assert!(matches!(
            platform.init(&Some(SocFamily::U8500)),
            Err(ClockError::InvalidArgument { .. })
        ));
    }

    #[test_case(SocFamily::U8500, "p1_uart0_kclk"; "u8500")]
    #[test_case(SocFamily::U5500, "p5_uart0_kclk"; "u5500")]
    fn test_topology_follows_soc(soc: SocFamily, uart: &str) {
        let simulated = SimulatedHardware::new();
        let clocks = platform(&simulated).init(&Some(soc)).unwrap();

        assert_eq!(clocks.soc, soc);
        assert_eq!(clocks.get(Some("uart0"), None), clocks.tree.find(uart));
    }

    #[test]
    fn test_lookups_resolve_devices() {
        let simulated = SimulatedHardware::new();
        let clocks = platform(&simulated).init(&Some(SocFamily::U8500)).unwrap();
        let tree = &clocks.tree;

        assert_eq!(
            clocks.get(Some("uart0"), Some("apb_pclk")),
            tree.find("p1_pclk2")
        );
        assert_eq!(clocks.get(Some("sdi0"), None), tree.find("p1_sdi0_kclk"));
        assert_eq!(clocks.get(Some("timer"), Some("mtu0")), tree.find("mtu0"));
        assert_eq!(clocks.get(Some("nothing"), None), None);
    }

    #[test]
    fn test_smp_timer_is_registered() {
        let simulated = SimulatedHardware::new();
        let clocks = platform(&simulated).init(&Some(SocFamily::U8500)).unwrap();

        let twd = clocks.get(Some(SMP_TWD), None).unwrap();
        assert_eq!(clocks.tree.get_rate(twd), 400_000_000);
    }

    #[test]
    fn test_uart_enable_reaches_hardware() {
        let simulated = SimulatedHardware::new();
        let clocks = platform(&simulated).init(&Some(SocFamily::U8500)).unwrap();
        let tree = &clocks.tree;
        let uart = clocks.get(Some("uart0"), None).unwrap();

        tree.enable(uart).unwrap();
        assert!(simulated.registers.kernel_gated(PRCC1, 1));
        assert!(simulated.controller.is_running(1));
        assert_eq!(count(tree, "uartclk"), 1);
        // The bus clock was only needed while the gate was written.
        assert_eq!(count(tree, "p1_pclk2"), 0);
        assert_eq!(count(tree, "per1clk"), 0);

        tree.disable(uart).unwrap();
        assert!(!simulated.registers.kernel_gated(PRCC1, 1));
        assert!(!simulated.controller.is_running(1));
        assert!(!simulated.controller.is_running(7));
    }

    #[test]
    fn test_timer_mux_switches_parent() {
        let simulated = SimulatedHardware::new();
        let clocks = platform(&simulated).init(&Some(SocFamily::U8500)).unwrap();
        let tree = &clocks.tree;
        let mtu0 = id(tree, "mtu0");
        tree.enable(mtu0).unwrap();
        assert_eq!(tree.get_rate(mtu0), 26_000_000);

        tree.set_parent(id(tree, "timclk"), id(tree, "ulp38m4")).unwrap();

        assert_eq!(tree.get_rate(mtu0), 38_400_000);
        assert_eq!(count(tree, "ulp38m4"), 1);
        assert_eq!(count(tree, "sysclk"), 0);
    }

    #[test]
    fn test_full_performance_clocks_share_floor() {
        let simulated = SimulatedHardware::new();
        let clocks = platform(&simulated).init(&Some(SocFamily::U8500)).unwrap();
        let dma = clocks.get(Some("dma40.0"), None).unwrap();
        let b2r2 = clocks.get(Some("b2r2"), None).unwrap();

        clocks.tree.enable(dma).unwrap();
        clocks.tree.enable(b2r2).unwrap();
        assert_eq!(clocks.operations.floor.requests(), 2);
        clocks.tree.disable(b2r2).unwrap();
        clocks.tree.disable(dma).unwrap();

        assert_eq!(simulated.controller.floor_raised(), 1);
        assert_eq!(simulated.controller.floor_released(), 1);
    }

    #[test]
    fn test_malformed_board_is_rejected() {
        assert!(matches!(
            BoardDescription::from_json("{ \"name\": \"broken\" }"),
            Err(ClockError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_board_without_topology_for_soc() {
        let board = BoardDescription::from_json(
            r#"{ "name": "half", "topologies": [ { "soc": "u5500", "clocks": [] } ] }"#,
        )
        .unwrap();
        let simulated = SimulatedHardware::new();
        let platform = ClockPlatform::new(board, simulated.hardware());

        assert!(matches!(
            platform.init(&Some(SocFamily::U8500)),
            Err(ClockError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_lookup_to_unknown_clock_is_rejected() {
        let board = BoardDescription::from_json(
            r#"{ "name": "bad", "topologies": [ {
                "soc": "u8500",
                "clocks": [ { "name": "sysclk", "rate": 26000000 } ],
                "lookups": [ { "clock": "missing", "dev_id": "uart0" } ]
            } ] }"#,
        )
        .unwrap();
        let simulated = SimulatedHardware::new();

        assert!(matches!(
            ClockPlatform::new(board, simulated.hardware()).init(&Some(SocFamily::U8500)),
            Err(ClockError::InvalidArgument { .. })
        ));
    }
}
