use bytemuck::Pod;
use num_traits::{Bounded, Num, NumCast, ToPrimitive};

/// Number of entries in the [`DataType`] enumeration, including `Invalid`.
pub const DT_TYPES_COUNT: u8 = 12;

/// Component data types an attribute can be stored with.
///
/// The discriminants are the values written to the attribute descriptor
/// table, so they must never be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DataType {
    Invalid = 0,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float32,
    Float64,
    Bool,
}

impl DataType {
    /// Size in bytes of a single component of this type.
    ///
    /// # Examples
    ///
    /// ```
    /// use draco_core::draco_types::DataType;
    ///
    /// assert_eq!(DataType::Uint16.byte_length(), 2);
    /// assert_eq!(DataType::Float64.byte_length(), 8);
    /// assert_eq!(DataType::Invalid.byte_length(), 0);
    /// ```
    pub fn byte_length(&self) -> usize {
        match self {
            DataType::Invalid => 0,
            DataType::Int8 | DataType::Uint8 | DataType::Bool => 1,
            DataType::Int16 | DataType::Uint16 => 2,
            DataType::Int32 | DataType::Uint32 | DataType::Float32 => 4,
            DataType::Int64 | DataType::Uint64 | DataType::Float64 => 8,
        }
    }

    /// Returns true for integer types and `Bool`.
    pub fn is_integral(&self) -> bool {
        match self {
            DataType::Float32 | DataType::Float64 | DataType::Invalid => false,
            _ => true,
        }
    }

    pub fn is_floating_point(&self) -> bool {
        matches!(self, DataType::Float32 | DataType::Float64)
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataType::Invalid => "invalid",
            DataType::Int8 => "int8",
            DataType::Uint8 => "uint8",
            DataType::Int16 => "int16",
            DataType::Uint16 => "uint16",
            DataType::Int32 => "int32",
            DataType::Uint32 => "uint32",
            DataType::Int64 => "int64",
            DataType::Uint64 => "uint64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Bool => "bool",
        }
    }
}

impl TryFrom<u8> for DataType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DataType::Invalid),
            1 => Ok(DataType::Int8),
            2 => Ok(DataType::Uint8),
            3 => Ok(DataType::Int16),
            4 => Ok(DataType::Uint16),
            5 => Ok(DataType::Int32),
            6 => Ok(DataType::Uint32),
            7 => Ok(DataType::Int64),
            8 => Ok(DataType::Uint64),
            9 => Ok(DataType::Float32),
            10 => Ok(DataType::Float64),
            11 => Ok(DataType::Bool),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Rust primitive that can be stored as an attribute component.
///
/// `Bool` attributes are stored as one byte per component and are read
/// through `u8`.
pub trait ValueType: Pod + Num + NumCast + Bounded + PartialOrd + ToPrimitive + Default {
    const DATA_TYPE: DataType;
}

impl ValueType for i8 {
    const DATA_TYPE: DataType = DataType::Int8;
}
impl ValueType for u8 {
    const DATA_TYPE: DataType = DataType::Uint8;
}
impl ValueType for i16 {
    const DATA_TYPE: DataType = DataType::Int16;
}
impl ValueType for u16 {
    const DATA_TYPE: DataType = DataType::Uint16;
}
impl ValueType for i32 {
    const DATA_TYPE: DataType = DataType::Int32;
}
impl ValueType for u32 {
    const DATA_TYPE: DataType = DataType::Uint32;
}
impl ValueType for i64 {
    const DATA_TYPE: DataType = DataType::Int64;
}
impl ValueType for u64 {
    const DATA_TYPE: DataType = DataType::Uint64;
}
impl ValueType for f32 {
    const DATA_TYPE: DataType = DataType::Float32;
}
impl ValueType for f64 {
    const DATA_TYPE: DataType = DataType::Float64;
}

/// Converts a single component between numeric types.
///
/// Returns `None` when the value cannot be represented in the output type.
/// With `normalized` set, integers map to floats in `[0, 1]` (or `[-1, 1]`
/// for signed sources) by dividing by the source maximum, and floats in
/// `[0, 1]` map to the full range of an integer output.
pub fn convert_component_value<S: ValueType, O: ValueType>(value: S, normalized: bool) -> Option<O> {
    let src_integral = S::DATA_TYPE.is_integral();
    let out_integral = O::DATA_TYPE.is_integral();
    if src_integral && !out_integral && normalized {
        let out: O = NumCast::from(value)?;
        let max: O = NumCast::from(S::max_value())?;
        Some(out / max)
    } else if !src_integral && out_integral && normalized {
        let v = value.to_f64()?;
        if !(0.0..=1.0).contains(&v) {
            return None;
        }
        let max = O::max_value().to_f64()?;
        NumCast::from((v * max + 0.5).floor())
    } else {
        NumCast::from(value)
    }
}
