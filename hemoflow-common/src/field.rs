use serde::{Deserialize, Serialize};

/// Radial resolution of the velocity grid (centerline to wall).
pub const NR: usize = 30;
/// Axial resolution of the velocity grid (inlet to outlet).
pub const NZ: usize = 80;

/// Axial velocity (m/s) sampled on an `NR x NZ` grid.
///
/// Storage is column-major: axial column `j` is one contiguous radial profile,
/// centerline (`i = 0`) first and wall (`i = NR - 1`) last. Columns are
/// independent within a solver sub-step, so this layout lets the solver hand
/// out one slice per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct VelocityField {
    values: Vec<f64>,
}

impl VelocityField {
    /// A quiescent field (all velocities zero).
    pub fn zeros() -> Self {
        Self { values: vec![0.0; NR * NZ] }
    }

    /// Flat index of radial cell `i` in axial column `j`.
    #[inline(always)]
    pub fn index(i: usize, j: usize) -> usize {
        j * NR + i
    }

    #[inline(always)]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[Self::index(i, j)]
    }

    #[inline(always)]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.values[Self::index(i, j)] = value;
    }

    /// Radial profile of axial column `j`.
    pub fn column(&self, j: usize) -> &[f64] {
        &self.values[j * NR..(j + 1) * NR]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.values
    }

    pub fn fill_zero(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0.0);
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }

    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    /// Largest velocity on the grid, or 0.0 for a field with no positive entries.
    pub fn max_velocity(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// Row-major `[i][j]` copy, the layout chart and canvas code expects.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..NR)
            .map(|i| (0..NZ).map(|j| self.get(i, j)).collect())
            .collect()
    }
}

impl Default for VelocityField {
    fn default() -> Self {
        Self::zeros()
    }
}

impl TryFrom<Vec<f64>> for VelocityField {
    type Error = anyhow::Error;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        if values.len() != NR * NZ {
            anyhow::bail!(
                "velocity field must hold {} values ({}x{}), got {}",
                NR * NZ,
                NR,
                NZ,
                values.len()
            );
        }
        Ok(Self { values })
    }
}

impl From<VelocityField> for Vec<f64> {
    fn from(field: VelocityField) -> Self {
        field.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_major_indexing() {
        let mut field = VelocityField::zeros();
        field.set(3, 7, 1.5);
        assert_eq!(field.get(3, 7), 1.5);
        assert_eq!(field.column(7)[3], 1.5);
        assert_eq!(field.to_rows()[3][7], 1.5);
        assert_eq!(field.max_velocity(), 1.5);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(VelocityField::try_from(vec![0.0; 10]).is_err());
        assert!(VelocityField::try_from(vec![0.0; NR * NZ]).is_ok());
    }

    #[test]
    fn deserialization_checks_length() {
        let json = serde_json::to_string(&vec![0.0f64; 4]).unwrap();
        assert!(serde_json::from_str::<VelocityField>(&json).is_err());
    }
}
