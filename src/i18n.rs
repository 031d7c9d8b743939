//! Localization
//!
//! UI strings for the three supported locales. Lookups fall back to
//! English when a locale has no entry for a key.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Supported UI locale
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    He,
    Ar,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::En, Locale::He, Locale::Ar];

    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::He => "he",
            Self::Ar => "ar",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Self::En),
            "he" => Some(Self::He),
            "ar" => Some(Self::Ar),
            _ => None,
        }
    }

    pub fn english_name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::He => "Hebrew",
            Self::Ar => "Arabic",
        }
    }

    pub fn native_name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::He => "עברית",
            Self::Ar => "العربية",
        }
    }

    /// Right-to-left script
    pub fn is_rtl(&self) -> bool {
        matches!(self, Self::He | Self::Ar)
    }

    /// Next locale in the switcher cycle
    pub fn next(&self) -> Self {
        match self {
            Self::En => Self::He,
            Self::He => Self::Ar,
            Self::Ar => Self::En,
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Translatable UI string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Text {
    // Landing
    BookNow,
    Hours,
    Address,
    // Step 1
    SelectService,
    WhatToBook,
    Minutes,
    UnableToLoadServices,
    // Step 2
    ChooseDate,
    // Step 3
    PickTime,
    NoAvailableTimes,
    TryAnotherDate,
    Morning,
    Afternoon,
    Evening,
    Available,
    // Step 4
    YourDetails,
    EnterYourDetails,
    YourAppointment,
    Date,
    Time,
    Price,
    FullName,
    EnterYourName,
    WhatsappNumber,
    VerificationHint,
    // Step 5
    Verification,
    EnterCode,
    VerifyingCode,
    Verified,
    DidntReceiveCode,
    ResendCode,
    Sending,
    SecondsToResend,
    WhatsappHelp,
    // Step 6
    RequestSent,
    RequestSubmitted,
    Service,
    NotifyWhatsapp,
    SubmitAnother,
    // Common
    Continue,
    Back,
    Loading,
    TryAgain,
    SendingCode,
    Theme,
    Language,
    Quit,
    Dismiss,
}

/// Look up `key` in `locale`, falling back to English
pub fn t(locale: Locale, key: Text) -> &'static str {
    let localized = match locale {
        Locale::En => None,
        Locale::He => he(key),
        Locale::Ar => ar(key),
    };
    localized.unwrap_or_else(|| en(key))
}

fn en(key: Text) -> &'static str {
    match key {
        Text::BookNow => "Book an appointment",
        Text::Hours => "Opening hours",
        Text::Address => "Address",
        Text::SelectService => "Select a service",
        Text::WhatToBook => "What would you like to book?",
        Text::Minutes => "min",
        Text::UnableToLoadServices => "Unable to load services",
        Text::ChooseDate => "Choose a date",
        Text::PickTime => "Pick a time",
        Text::NoAvailableTimes => "No available times",
        Text::TryAnotherDate => "Try selecting another date",
        Text::Morning => "Morning",
        Text::Afternoon => "Afternoon",
        Text::Evening => "Evening",
        Text::Available => "available",
        Text::YourDetails => "Your Details",
        Text::EnterYourDetails => "Enter your contact information",
        Text::YourAppointment => "Your Appointment",
        Text::Date => "Date",
        Text::Time => "Time",
        Text::Price => "Price",
        Text::FullName => "Full Name",
        Text::EnterYourName => "Enter your name",
        Text::WhatsappNumber => "WhatsApp Number",
        Text::VerificationHint => "We'll send a code via WhatsApp to verify",
        Text::Verification => "Verification",
        Text::EnterCode => "Enter the 4-digit code sent to",
        Text::VerifyingCode => "Verifying your code...",
        Text::Verified => "Verified!",
        Text::DidntReceiveCode => "Didn't receive the code?",
        Text::ResendCode => "Resend code",
        Text::Sending => "Sending...",
        Text::SecondsToResend => "seconds to resend",
        Text::WhatsappHelp => {
            "Make sure you have WhatsApp installed and your phone number is correct."
        }
        Text::RequestSent => "Request Sent!",
        Text::RequestSubmitted => "Your appointment request has been submitted",
        Text::Service => "Service",
        Text::NotifyWhatsapp => "We'll notify you on WhatsApp once confirmed",
        Text::SubmitAnother => "Submit another request",
        Text::Continue => "Continue",
        Text::Back => "Back",
        Text::Loading => "Loading...",
        Text::TryAgain => "Try again",
        Text::SendingCode => "Sending code...",
        Text::Theme => "Theme",
        Text::Language => "Language",
        Text::Quit => "Quit",
        Text::Dismiss => "Dismiss",
    }
}

fn he(key: Text) -> Option<&'static str> {
    Some(match key {
        Text::BookNow => "הזמן תור",
        Text::Hours => "שעות פעילות",
        Text::Address => "כתובת",
        Text::SelectService => "בחר שירות",
        Text::WhatToBook => "מה תרצה להזמין?",
        Text::Minutes => "דק׳",
        Text::UnableToLoadServices => "לא ניתן לטעון שירותים",
        Text::ChooseDate => "בחר תאריך",
        Text::PickTime => "בחר שעה",
        Text::NoAvailableTimes => "אין שעות פנויות",
        Text::TryAnotherDate => "נסה לבחור תאריך אחר",
        Text::Morning => "בוקר",
        Text::Afternoon => "צהריים",
        Text::Evening => "ערב",
        Text::Available => "זמינים",
        Text::YourDetails => "הפרטים שלך",
        Text::EnterYourDetails => "הזן את פרטי הקשר שלך",
        Text::YourAppointment => "התור שלך",
        Text::Date => "תאריך",
        Text::Time => "שעה",
        Text::Price => "מחיר",
        Text::FullName => "שם מלא",
        Text::EnterYourName => "הכנס את שמך",
        Text::WhatsappNumber => "מספר וואטסאפ",
        Text::VerificationHint => "נשלח קוד אימות בוואטסאפ",
        Text::Verification => "אימות",
        Text::EnterCode => "הזן את הקוד בן 4 הספרות שנשלח אל",
        Text::VerifyingCode => "מאמת את הקוד...",
        Text::Verified => "אומת!",
        Text::DidntReceiveCode => "לא קיבלת את הקוד?",
        Text::ResendCode => "שלח שוב",
        Text::Sending => "שולח...",
        Text::SecondsToResend => "שניות לשליחה חוזרת",
        Text::WhatsappHelp => "ודא שוואטסאפ מותקן ושמספר הטלפון נכון.",
        Text::RequestSent => "הבקשה נשלחה!",
        Text::RequestSubmitted => "בקשת התור שלך הוגשה בהצלחה",
        Text::Service => "שירות",
        Text::NotifyWhatsapp => "נודיע לך בוואטסאפ כשהתור יאושר",
        Text::SubmitAnother => "שלח בקשה נוספת",
        Text::Continue => "המשך",
        Text::Back => "חזור",
        Text::Loading => "טוען...",
        Text::TryAgain => "נסה שוב",
        Text::SendingCode => "שולח קוד...",
        Text::Theme => "ערכת נושא",
        Text::Language => "שפה",
        Text::Quit => "יציאה",
        Text::Dismiss => "סגור",
    })
}

fn ar(key: Text) -> Option<&'static str> {
    Some(match key {
        Text::BookNow => "احجز موعداً",
        Text::Hours => "ساعات العمل",
        Text::Address => "العنوان",
        Text::SelectService => "اختر خدمة",
        Text::WhatToBook => "ماذا تريد أن تحجز؟",
        Text::Minutes => "دقيقة",
        Text::ChooseDate => "اختر تاريخ",
        Text::PickTime => "اختر وقت",
        Text::NoAvailableTimes => "لا توجد أوقات متاحة",
        Text::TryAnotherDate => "جرب اختيار تاريخ آخر",
        Text::Morning => "صباحاً",
        Text::Afternoon => "ظهراً",
        Text::Evening => "مساءً",
        Text::Available => "متاح",
        Text::YourDetails => "بياناتك",
        Text::EnterYourDetails => "أدخل معلومات الاتصال الخاصة بك",
        Text::YourAppointment => "موعدك",
        Text::Date => "التاريخ",
        Text::Time => "الوقت",
        Text::Price => "السعر",
        Text::FullName => "الاسم الكامل",
        Text::EnterYourName => "أدخل اسمك",
        Text::WhatsappNumber => "رقم واتساب",
        Text::VerificationHint => "سنرسل رمز تحقق عبر واتساب",
        Text::Verification => "التحقق",
        Text::EnterCode => "أدخل الرمز المكون من 4 أرقام المرسل إلى",
        Text::VerifyingCode => "جاري التحقق من الرمز...",
        Text::Verified => "تم التحقق!",
        Text::DidntReceiveCode => "لم تستلم الرمز؟",
        Text::ResendCode => "إعادة الإرسال",
        Text::Sending => "جاري الإرسال...",
        Text::SecondsToResend => "ثانية لإعادة الإرسال",
        Text::WhatsappHelp => "تأكد من تثبيت واتساب وصحة رقم هاتفك.",
        Text::RequestSent => "تم إرسال الطلب!",
        Text::RequestSubmitted => "تم تقديم طلب موعدك بنجاح",
        Text::Service => "الخدمة",
        Text::NotifyWhatsapp => "سنخبرك عبر واتساب عند التأكيد",
        Text::SubmitAnother => "تقديم طلب آخر",
        Text::Continue => "متابعة",
        Text::Back => "رجوع",
        Text::Loading => "جاري التحميل...",
        Text::TryAgain => "حاول مرة أخرى",
        Text::SendingCode => "جاري إرسال الرمز...",
        Text::Language => "اللغة",
        Text::Quit => "خروج",
        Text::Dismiss => "إغلاق",
        _ => return None,
    })
}

const EN_WEEKDAYS_SHORT: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];
const HE_WEEKDAYS_SHORT: [&str; 7] = ["א׳", "ב׳", "ג׳", "ד׳", "ה׳", "ו׳", "ש׳"];
const AR_WEEKDAYS_SHORT: [&str; 7] = ["أحد", "إثن", "ثلا", "أرب", "خمي", "جمع", "سبت"];

const EN_WEEKDAYS: [&str; 7] = [
    "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
];
const HE_WEEKDAYS: [&str; 7] = [
    "יום ראשון", "יום שני", "יום שלישי", "יום רביעי", "יום חמישי", "יום שישי", "שבת",
];
const AR_WEEKDAYS: [&str; 7] = [
    "الأحد", "الإثنين", "الثلاثاء", "الأربعاء", "الخميس", "الجمعة", "السبت",
];

const EN_MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];
const HE_MONTHS: [&str; 12] = [
    "ינואר", "פברואר", "מרץ", "אפריל", "מאי", "יוני", "יולי", "אוגוסט", "ספטמבר", "אוקטובר",
    "נובמבר", "דצמבר",
];
const AR_MONTHS: [&str; 12] = [
    "يناير", "فبراير", "مارس", "أبريل", "مايو", "يونيو", "يوليو", "أغسطس", "سبتمبر", "أكتوبر",
    "نوفمبر", "ديسمبر",
];

/// Two/three letter weekday header, Sunday first
pub fn weekday_short(locale: Locale, days_from_sunday: usize) -> &'static str {
    let table = match locale {
        Locale::En => &EN_WEEKDAYS_SHORT,
        Locale::He => &HE_WEEKDAYS_SHORT,
        Locale::Ar => &AR_WEEKDAYS_SHORT,
    };
    table[days_from_sunday % 7]
}

fn weekday_full(locale: Locale, date: NaiveDate) -> &'static str {
    let table = match locale {
        Locale::En => &EN_WEEKDAYS,
        Locale::He => &HE_WEEKDAYS,
        Locale::Ar => &AR_WEEKDAYS,
    };
    table[date.weekday().num_days_from_sunday() as usize]
}

/// Month name for a 1-based month number
pub fn month_name(locale: Locale, month: u32) -> &'static str {
    let table = match locale {
        Locale::En => &EN_MONTHS,
        Locale::He => &HE_MONTHS,
        Locale::Ar => &AR_MONTHS,
    };
    table[(month.clamp(1, 12) - 1) as usize]
}

/// English abbreviates to three letters; Hebrew and Arabic keep full names.
fn shorten(locale: Locale, word: &'static str) -> String {
    match locale {
        Locale::En => word.chars().take(3).collect(),
        _ => word.to_string(),
    }
}

/// "January 2027"
pub fn format_month_year(date: NaiveDate, locale: Locale) -> String {
    format!("{} {}", month_name(locale, date.month()), date.year())
}

/// "Tuesday, January 7"
pub fn format_date_localized(date: NaiveDate, locale: Locale) -> String {
    format!(
        "{}, {} {}",
        weekday_full(locale, date),
        month_name(locale, date.month()),
        date.day()
    )
}

/// "Jan 7"
pub fn format_date_short(date: NaiveDate, locale: Locale) -> String {
    format!(
        "{} {}",
        shorten(locale, month_name(locale, date.month())),
        date.day()
    )
}

/// "Tue, Jan 7"
pub fn format_date_short_with_weekday(date: NaiveDate, locale: Locale) -> String {
    format!(
        "{}, {} {}",
        shorten(locale, weekday_full(locale, date)),
        shorten(locale, month_name(locale, date.month())),
        date.day()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan7() -> NaiveDate {
        // 2025-01-07 is a Tuesday
        NaiveDate::from_ymd_opt(2025, 1, 7).unwrap()
    }

    #[test]
    fn test_locale_codes_round_trip_through_from_code() {
        for locale in Locale::ALL {
            assert_eq!(Locale::from_code(locale.code()), Some(locale));
        }
        assert_eq!(Locale::from_code(" HE "), Some(Locale::He));
        assert_eq!(Locale::from_code("fr"), None);
    }

    #[test]
    fn test_rtl_locales() {
        assert!(!Locale::En.is_rtl());
        assert!(Locale::He.is_rtl());
        assert!(Locale::Ar.is_rtl());
    }

    #[test]
    fn test_locale_cycle_visits_all() {
        let mut locale = Locale::En;
        locale = locale.next();
        assert_eq!(locale, Locale::He);
        locale = locale.next();
        assert_eq!(locale, Locale::Ar);
        assert_eq!(locale.next(), Locale::En);
    }

    #[test]
    fn test_missing_translation_falls_back_to_english() {
        // Arabic table has no entry for Theme
        assert_eq!(t(Locale::Ar, Text::Theme), "Theme");
        assert_eq!(t(Locale::He, Text::Continue), "המשך");
        assert_eq!(t(Locale::En, Text::Continue), "Continue");
    }

    #[test]
    fn test_format_date_short() {
        assert_eq!(format_date_short(jan7(), Locale::En), "Jan 7");
        assert_eq!(format_date_short(jan7(), Locale::He), "ינואר 7");
    }

    #[test]
    fn test_format_date_with_weekday() {
        assert_eq!(format_date_short_with_weekday(jan7(), Locale::En), "Tue, Jan 7");
        assert_eq!(format_date_localized(jan7(), Locale::En), "Tuesday, January 7");
        assert_eq!(
            format_date_localized(jan7(), Locale::Ar),
            "الثلاثاء, يناير 7"
        );
    }

    #[test]
    fn test_weekday_headers_are_sunday_first() {
        assert_eq!(weekday_short(Locale::En, 0), "Su");
        assert_eq!(weekday_short(Locale::En, 6), "Sa");
        assert_eq!(format_month_year(jan7(), Locale::En), "January 2025");
    }
}
