//! Built-in mapper bundles.
//!
//! Only mathematically exact widenings are registered as lossless;
//! narrowings decide per value whether the conversion preserved information.

use crate::builder::{ConflictStrategy, DefaultBundle};
use crate::mapping::{Mapper, MappingContext, MappingResult};
use crate::model::Type;
use crate::Bridge;

pub(crate) fn register_bundle(bridge: &Bridge, bundle: DefaultBundle) {
    match bundle {
        DefaultBundle::WideningNumeric => register_widening(bridge),
        DefaultBundle::NarrowingNumeric => register_narrowing(bridge),
        DefaultBundle::Strings => register_strings(bridge),
    }
}

// Registration runs under Ignore so a bundle listed twice in a config does
// not trip the duplicate-registration fault.
macro_rules! widen {
    ($bridge:expr, $($s:ty => $t:ty),+ $(,)?) => {
        $(
            $bridge.register_with(
                Type::<$s>::of(),
                Type::<$t>::of(),
                Mapper::uni(|value: $s, _: &MappingContext| {
                    MappingResult::Lossless(value as $t)
                }),
                ConflictStrategy::Ignore,
                &[],
            );
        )+
    };
}

macro_rules! narrow {
    ($bridge:expr, $($s:ty => $t:ty),+ $(,)?) => {
        $(
            $bridge.register_with(
                Type::<$s>::of(),
                Type::<$t>::of(),
                Mapper::uni(|value: $s, _: &MappingContext| match <$t>::try_from(value) {
                    Ok(narrowed) => MappingResult::Lossless(narrowed),
                    Err(_) => MappingResult::failure(format!(
                        "number out of range for {}",
                        stringify!($t)
                    )),
                }),
                ConflictStrategy::Ignore,
                &[],
            );
        )+
    };
}

macro_rules! text {
    ($bridge:expr, $($t:ty),+ $(,)?) => {
        $(
            $bridge.register_with(
                Type::<$t>::of(),
                Type::<String>::of(),
                Mapper::uni(|value: $t, _: &MappingContext| {
                    MappingResult::Lossless(value.to_string())
                }),
                ConflictStrategy::Ignore,
                &[],
            );
            $bridge.register_with(
                Type::<String>::of(),
                Type::<$t>::of(),
                Mapper::uni(|value: String, _: &MappingContext| match value.parse::<$t>() {
                    Ok(parsed) => MappingResult::Lossless(parsed),
                    Err(_) => MappingResult::failure(format!(
                        "cannot parse '{value}' as {}",
                        stringify!($t)
                    )),
                }),
                ConflictStrategy::Ignore,
                &[],
            );
        )+
    };
}

fn register_widening(bridge: &Bridge) {
    widen!(bridge,
        i8 => i16, i8 => i32, i8 => i64, i8 => f32, i8 => f64,
        i16 => i32, i16 => i64, i16 => f32, i16 => f64,
        i32 => i64, i32 => f64,
        u8 => u16, u8 => u32, u8 => u64, u8 => i16, u8 => i32, u8 => i64, u8 => f32, u8 => f64,
        u16 => u32, u16 => u64, u16 => i32, u16 => i64, u16 => f32, u16 => f64,
        u32 => u64, u32 => i64, u32 => f64,
        f32 => f64,
        char => u32,
    );
}

fn register_narrowing(bridge: &Bridge) {
    narrow!(bridge,
        i64 => i32, i64 => i16, i64 => i8,
        i32 => i16, i32 => i8,
        i16 => i8,
        u64 => u32, u64 => u16, u64 => u8,
        u32 => u16, u32 => u8,
        u16 => u8,
        u32 => char,
    );

    // Floats need value-level checks instead of TryFrom.
    bridge.register_with(
        Type::<f64>::of(),
        Type::<f32>::of(),
        Mapper::uni(|value: f64, _: &MappingContext| {
            let narrowed = value as f32;
            if f64::from(narrowed) == value {
                MappingResult::Lossless(narrowed)
            } else {
                MappingResult::Lossy(narrowed)
            }
        }),
        ConflictStrategy::Ignore,
        &[],
    );
    bridge.register_with(
        Type::<f64>::of(),
        Type::<i64>::of(),
        Mapper::uni(|value: f64, _: &MappingContext| {
            if !value.is_finite() || value < i64::MIN as f64 || value > i64::MAX as f64 {
                MappingResult::failure("number out of range for i64")
            } else if value.fract() == 0.0 {
                MappingResult::Lossless(value as i64)
            } else {
                MappingResult::Lossy(value as i64)
            }
        }),
        ConflictStrategy::Ignore,
        &[],
    );
}

fn register_strings(bridge: &Bridge) {
    text!(bridge, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, bool);

    bridge.register_with(
        Type::<String>::of(),
        Type::<Vec<char>>::of(),
        Mapper::bi(
            |value: String, _: &MappingContext| MappingResult::Lossless(value.chars().collect()),
            |value: Vec<char>, _: &MappingContext| {
                MappingResult::Lossless(value.into_iter().collect())
            },
        ),
        ConflictStrategy::Ignore,
        &[],
    );
}
