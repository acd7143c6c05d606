pub mod team;

pub mod bundles;

pub mod match_snapshot;

pub mod drawing_support {
    use arrayvec::ArrayString;
    use core::fmt::Write;
    use more_asserts::assert_le;

    /// Length of a match, in seconds
    pub const MATCH_DURATION_SECS: u16 = 1800;

    pub const MAX_STRINGABLE_SECS: u16 = 5999;

    /// Formats a number of seconds as `MM:SS`
    pub fn secs_to_time_string(secs: u16) -> ArrayString<5> {
        assert_le!(secs, MAX_STRINGABLE_SECS);
        let min = secs / 60;
        let sec = secs % 60;
        let mut time_string = ArrayString::new();
        // Can't overflow, `MAX_STRINGABLE_SECS` keeps the minutes to two digits
        let _ = write!(&mut time_string, "{min:02}:{sec:02}");
        time_string
    }

    #[cfg(test)]
    mod test {
        use super::*;

        #[test]
        fn test_secs_to_time_string() {
            assert_eq!(&secs_to_time_string(MATCH_DURATION_SECS), "30:00");
            assert_eq!(&secs_to_time_string(1750), "29:10");
            assert_eq!(&secs_to_time_string(65), "01:05");
            assert_eq!(&secs_to_time_string(9), "00:09");
            assert_eq!(&secs_to_time_string(0), "00:00");
            assert_eq!(&secs_to_time_string(MAX_STRINGABLE_SECS), "99:59");
        }

        #[test]
        #[should_panic]
        fn test_secs_to_time_string_too_long() {
            secs_to_time_string(MAX_STRINGABLE_SECS + 1);
        }
    }
}
