use half::{bf16, f16};

/// Element type of a tensor.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Hash)]
pub enum DType {
    F16,
    BF16,
    #[default]
    F32,
    F64,
}

impl DType {
    /// Returns the size of the type in bytes.
    pub fn size_of(self) -> usize {
        match self {
            DType::F16 => 2,
            DType::BF16 => 2,
            DType::F32 => 4,
            DType::F64 => 8,
        }
    }
}

/// Floating-point element types a [`crate::Storage`] can hold.
pub trait TensorDType:
    num_traits::Float + Copy + std::fmt::Debug + std::fmt::Display + Send + Sync + 'static
{
    fn dt() -> DType;
}

macro_rules! map_type {
    ($t:ty, $v:ident) => {
        impl TensorDType for $t {
            fn dt() -> DType {
                DType::$v
            }
        }
    };
}

map_type!(f16, F16);
map_type!(bf16, BF16);
map_type!(f32, F32);
map_type!(f64, F64);
