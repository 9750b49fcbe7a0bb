/// Asserts the number of alive beans.
#[macro_export]
macro_rules! assert_population {
    ($world:expr, $count:expr) => {
        assert_eq!($world.beans().len(), $count, "Population count mismatch");
    };
}

/// Asserts that a bean left the alive set and was recorded as dead.
#[macro_export]
macro_rules! assert_bean_dead {
    ($world:expr, $id:expr) => {
        assert!(
            !$world.beans().iter().any(|b| b.id() == $id),
            "Bean {} should be dead but is alive",
            $id
        );
        assert!(
            $world.dead_beans().iter().any(|r| r.bean.id() == $id),
            "Bean {} has no death record",
            $id
        );
    };
}

/// Asserts two floats agree within `eps`.
#[macro_export]
macro_rules! assert_close {
    ($a:expr, $b:expr, $eps:expr) => {
        let (a, b): (f64, f64) = ($a, $b);
        assert!((a - b).abs() <= $eps, "{} and {} differ by more than {}", a, b, $eps);
    };
}
