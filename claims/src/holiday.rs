use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// US federal holidays with nearest-workday observance: a holiday landing on
/// Saturday is observed the Friday before, on Sunday the Monday after.
pub fn is_federal_holiday(date: NaiveDate) -> bool {
    let year = date.year();
    if holidays_for(year).contains(&date) {
        return true;
    }
    // New Year's Day of the following year can be observed on December 31.
    date.month() == 12 && observed(NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap()) == date
}

fn holidays_for(year: i32) -> Vec<NaiveDate> {
    let fixed = |month, day| observed(NaiveDate::from_ymd_opt(year, month, day).unwrap());
    vec![
        fixed(1, 1),                            // New Year's Day
        nth_weekday(year, 1, Weekday::Mon, 3),  // Martin Luther King Jr. Day
        nth_weekday(year, 2, Weekday::Mon, 3),  // Washington's Birthday
        last_weekday(year, 5, Weekday::Mon),    // Memorial Day
        fixed(6, 19),                           // Juneteenth
        fixed(7, 4),                            // Independence Day
        nth_weekday(year, 9, Weekday::Mon, 1),  // Labor Day
        nth_weekday(year, 10, Weekday::Mon, 2), // Columbus Day
        fixed(11, 11),                          // Veterans Day
        nth_weekday(year, 11, Weekday::Thu, 4), // Thanksgiving
        fixed(12, 25),                          // Christmas
    ]
}

fn observed(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date - Duration::days(1),
        Weekday::Sun => date + Duration::days(1),
        _ => date,
    }
}

fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> NaiveDate {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n as u8)
        .expect("nth weekday exists for every month")
}

fn last_weekday(year: i32, month: u32, weekday: Weekday) -> NaiveDate {
    match NaiveDate::from_weekday_of_month_opt(year, month, weekday, 5) {
        Some(date) => date,
        None => NaiveDate::from_weekday_of_month_opt(year, month, weekday, 4)
            .expect("every month has four of each weekday"),
    }
}
