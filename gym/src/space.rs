use rand::Rng;

/// Declared shape of actions or observations.
#[derive(Debug, Clone, PartialEq)]
pub enum Space {
    /// Integers in `0..n`.
    Discrete(u32),
    MultiBinary(usize),
    Box {
        low: f32,
        high: f32,
        shape: Vec<usize>,
    },
    Tuple(Vec<Space>),
}

/// A concrete point that may or may not lie in a [`Space`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Binary(Vec<bool>),
    /// Row-major data with its shape.
    Array { shape: Vec<usize>, data: Vec<f32> },
    Tuple(Vec<Value>),
}

impl Space {
    pub fn contains(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Discrete(n), Value::Int(v)) => (0..i64::from(*n)).contains(v),
            (Self::MultiBinary(n), Value::Binary(bits)) => bits.len() == *n,
            (
                Self::Box { low, high, shape },
                Value::Array {
                    shape: value_shape,
                    data,
                },
            ) => {
                shape == value_shape
                    && data.len() == shape.iter().product::<usize>()
                    && data.iter().all(|x| (*low..=*high).contains(x))
            }
            (Self::Tuple(spaces), Value::Tuple(values)) => {
                spaces.len() == values.len()
                    && spaces.iter().zip(values).all(|(s, v)| s.contains(v))
            }
            _ => false,
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Value {
        match self {
            Self::Discrete(n) => Value::Int(i64::from(rng.random_range(0..*n))),
            Self::MultiBinary(n) => Value::Binary((0..*n).map(|_| rng.random_bool(0.5)).collect()),
            Self::Box { low, high, shape } => Value::Array {
                shape: shape.clone(),
                data: (0..shape.iter().product::<usize>())
                    .map(|_| rng.random_range(*low..=*high))
                    .collect(),
            },
            Self::Tuple(spaces) => Value::Tuple(spaces.iter().map(|s| s.sample(rng)).collect()),
        }
    }
}
