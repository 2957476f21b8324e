//! Octahedral encoding of unit vectors.
//!
//! A unit vector is projected onto the octahedron `|x| + |y| + |z| = 1`, the
//! lower hemisphere is folded outwards and the resulting square is sampled on
//! a `(2^bits - 1)` grid. The pair `(s, t)` is always in `[0, max_value]`.

#[derive(Debug, Clone, Copy)]
pub struct OctahedronToolBox {
    quantization_bits: i32,
    max_quantized_value: i32,
    max_value: i32,
    dequantization_scale: f32,
    center_value: i32,
}

impl Default for OctahedronToolBox {
    fn default() -> Self {
        Self {
            quantization_bits: -1,
            max_quantized_value: -1,
            max_value: -1,
            dequantization_scale: 1.0,
            center_value: -1,
        }
    }
}

impl OctahedronToolBox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Valid range is `2..=30`.
    pub fn set_quantization_bits(&mut self, q: i32) -> bool {
        if !(2..=30).contains(&q) {
            return false;
        }
        self.quantization_bits = q;
        self.max_quantized_value = (1 << q) - 1;
        self.max_value = self.max_quantized_value - 1;
        self.dequantization_scale = 2.0 / self.max_value as f32;
        self.center_value = self.max_value / 2;
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.quantization_bits != -1
    }

    pub fn quantization_bits(&self) -> i32 {
        self.quantization_bits
    }

    pub fn max_quantized_value(&self) -> i32 {
        self.max_quantized_value
    }

    pub fn max_value(&self) -> i32 {
        self.max_value
    }

    pub fn center_value(&self) -> i32 {
        self.center_value
    }

    /// Maps the points on the border of the square that represent the same
    /// direction onto a single representative.
    pub fn canonicalize_octahedral_coords(&self, s: i32, t: i32) -> (i32, i32) {
        let (mut s, mut t) = (s, t);
        if (s == 0 && t == 0) || (s == 0 && t == self.max_value) || (s == self.max_value && t == 0) {
            s = self.max_value;
            t = self.max_value;
        } else if s == 0 && t > self.center_value {
            t = self.center_value - (t - self.center_value);
        } else if s == self.max_value && t < self.center_value {
            t = self.center_value + (self.center_value - t);
        } else if t == self.max_value && s < self.center_value {
            s = self.center_value + (self.center_value - s);
        } else if t == 0 && s > self.center_value {
            s = self.center_value - (s - self.center_value);
        }
        (s, t)
    }

    /// `int_vec` must have an L1 norm equal to the center value.
    pub fn integer_vector_to_quantized_octahedral_coords(&self, int_vec: &[i32; 3]) -> (i32, i32) {
        debug_assert_eq!(int_vec[0].abs() + int_vec[1].abs() + int_vec[2].abs(), self.center_value);
        let (s, t) = if int_vec[0] >= 0 {
            (int_vec[1] + self.center_value, int_vec[2] + self.center_value)
        } else {
            let s = if int_vec[1] < 0 {
                int_vec[2].abs()
            } else {
                self.max_value - int_vec[2].abs()
            };
            let t = if int_vec[2] < 0 {
                int_vec[1].abs()
            } else {
                self.max_value - int_vec[1].abs()
            };
            (s, t)
        };
        self.canonicalize_octahedral_coords(s, t)
    }

    /// Vectors do not need to be normalized; a zero vector maps to `+X`.
    pub fn float_vector_to_quantized_octahedral_coords(&self, vector: &[f32; 3]) -> (i32, i32) {
        let abs_sum = vector.iter().map(|v| (*v as f64).abs()).sum::<f64>();

        let scaled_vector = if abs_sum > 1e-6 {
            let scale = 1.0 / abs_sum;
            [vector[0] as f64 * scale, vector[1] as f64 * scale, vector[2] as f64 * scale]
        } else {
            [1.0, 0.0, 0.0]
        };

        let center = self.center_value as f64;
        let mut int_vec = [
            (scaled_vector[0] * center + 0.5).floor() as i32,
            (scaled_vector[1] * center + 0.5).floor() as i32,
            0,
        ];
        // The L1 norm has to be exactly the center value.
        int_vec[2] = self.center_value - int_vec[0].abs() - int_vec[1].abs();
        if int_vec[2] < 0 {
            if int_vec[1] > 0 {
                int_vec[1] += int_vec[2];
            } else {
                int_vec[1] -= int_vec[2];
            }
            int_vec[2] = 0;
        }
        if scaled_vector[2] < 0.0 {
            int_vec[2] = -int_vec[2];
        }

        self.integer_vector_to_quantized_octahedral_coords(&int_vec)
    }

    pub fn quantized_octahedral_coords_to_unit_vector(&self, s: i32, t: i32) -> [f32; 3] {
        let mut y = s as f32 * self.dequantization_scale - 1.0;
        let mut z = t as f32 * self.dequantization_scale - 1.0;
        let x = 1.0 - y.abs() - z.abs();

        // Unfold the lower hemisphere.
        let x_offset = (-x).max(0.0);
        y += if y < 0.0 { x_offset } else { -x_offset };
        z += if z < 0.0 { x_offset } else { -x_offset };

        let norm_squared = x * x + y * y + z * z;
        if norm_squared < 1e-6 {
            [0.0, 0.0, 0.0]
        } else {
            let d = 1.0 / norm_squared.sqrt();
            [x * d, y * d, z * d]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32; 3], b: &[f32; 3]) -> f32 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    #[test]
    fn test_quantization_bits_range() {
        let mut tool_box = OctahedronToolBox::new();
        assert!(!tool_box.is_initialized());
        assert!(!tool_box.set_quantization_bits(1));
        assert!(!tool_box.set_quantization_bits(31));
        assert!(tool_box.set_quantization_bits(8));
        assert_eq!(tool_box.max_quantized_value(), 255);
        assert_eq!(tool_box.max_value(), 254);
        assert_eq!(tool_box.center_value(), 127);
    }

    #[test]
    fn test_axes_round_trip() {
        let mut tool_box = OctahedronToolBox::new();
        assert!(tool_box.set_quantization_bits(10));
        let axes = [
            [1.0f32, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, -1.0],
        ];
        for axis in axes.iter() {
            let (s, t) = tool_box.float_vector_to_quantized_octahedral_coords(axis);
            assert!((0..=tool_box.max_value()).contains(&s));
            assert!((0..=tool_box.max_value()).contains(&t));
            let back = tool_box.quantized_octahedral_coords_to_unit_vector(s, t);
            assert!(dot(axis, &back) > 0.9999, "{:?} -> {:?}", axis, back);
        }
    }

    #[test]
    fn test_diagonal_round_trip() {
        let mut tool_box = OctahedronToolBox::new();
        assert!(tool_box.set_quantization_bits(12));
        let n = 1.0 / 3.0f32.sqrt();
        for signs in [[1.0f32, 1.0, 1.0], [-1.0, 1.0, -1.0], [-1.0, -1.0, -1.0], [1.0, -1.0, -1.0]].iter() {
            let v = [n * signs[0], n * signs[1], n * signs[2]];
            let (s, t) = tool_box.float_vector_to_quantized_octahedral_coords(&v);
            let back = tool_box.quantized_octahedral_coords_to_unit_vector(s, t);
            assert!(dot(&v, &back) > 0.999, "{:?} -> {:?}", v, back);
        }
    }

    #[test]
    fn test_zero_vector_maps_to_x_axis() {
        let mut tool_box = OctahedronToolBox::new();
        assert!(tool_box.set_quantization_bits(8));
        let (s, t) = tool_box.float_vector_to_quantized_octahedral_coords(&[0.0, 0.0, 0.0]);
        let back = tool_box.quantized_octahedral_coords_to_unit_vector(s, t);
        assert!(back[0] > 0.999);
    }
}
