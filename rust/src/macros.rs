/// Generate one `#[test]` per conformance check for a calendar constructor.
///
/// `$build` must produce a concrete calendar type, not a boxed trait object.
///
/// ```ignore
/// calendar_index::calendar_conformance_tests!(linked, LinkedListCalendar::new());
/// ```
///
/// expands to `linked_basic_scenario`, `linked_domain_boundaries`, and so on,
/// each running against a freshly built calendar.
#[macro_export]
macro_rules! calendar_conformance_tests {
    ($prefix:ident, $build:expr) => {
        $crate::calendar_conformance_tests!(@checks $prefix, $build;
            basic_scenario,
            domain_boundaries,
            delete_is_idempotent,
            duplicates_rejected,
            load_keeps_ties_stable,
            load_then_delete_all,
            count_matches_report,
            clear_resets,
        );
    };
    (@checks $prefix:ident, $build:expr; $($check:ident),* $(,)?) => {
        $(
            $crate::__paste::paste! {
                #[test]
                fn [<$prefix _ $check>]() {
                    let mut calendar = $build;
                    $crate::conformance::$check(&mut calendar);
                }
            }
        )*
    };
}
