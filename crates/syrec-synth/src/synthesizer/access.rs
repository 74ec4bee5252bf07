//! Resolution of signal accesses to circuit lines.

use syrec_ir::LineId;
use syrec_lang::{BitRange, VariableAccess};

use super::Synthesizer;
use crate::error::{SynthesisError, SynthesisResult};

impl Synthesizer<'_> {
    /// Lines selected by an access, least significant bit first.
    ///
    /// A reversed bit range `x.3:0` yields the bits in descending order.
    pub(super) fn resolve_access(&self, access: &VariableAccess) -> SynthesisResult<Vec<LineId>> {
        let name = access.name.as_str();
        let unknown = || SynthesisError::UnknownSignal(name.to_string());
        let signal = self.invocation.module.find_signal(name).ok_or_else(unknown)?;
        let lines = self.invocation.signals.get(name).ok_or_else(unknown)?;

        if access.indices.len() != signal.dimensions.len() {
            return Err(SynthesisError::DimensionMismatch {
                signal: name.to_string(),
                expected: signal.dimensions.len(),
                found: access.indices.len(),
            });
        }

        let mut element = 0u64;
        for (index, &size) in access.indices.iter().zip(&signal.dimensions) {
            let value = self
                .fold(index)?
                .ok_or_else(|| SynthesisError::NonConstantIndex {
                    signal: name.to_string(),
                })?;
            if value >= u64::from(size) {
                return Err(SynthesisError::IndexOutOfRange {
                    signal: name.to_string(),
                    index: value,
                    size,
                });
            }
            element = element * u64::from(size) + value;
        }

        let width = u64::from(signal.width);
        let base = element * width;
        let bits: Vec<u64> = match &access.range {
            None => (0..width).collect(),
            Some(BitRange { start, end }) => {
                let start = self.evaluate_number(start)?;
                let end = match end {
                    Some(end) => self.evaluate_number(end)?,
                    None => start,
                };
                for bit in [start, end] {
                    if bit >= width {
                        return Err(SynthesisError::BitOutOfRange {
                            signal: name.to_string(),
                            bit,
                            width: signal.width,
                        });
                    }
                }
                if start <= end {
                    (start..=end).collect()
                } else {
                    (end..=start).rev().collect()
                }
            }
        };

        bits.into_iter()
            .map(|bit| {
                lines
                    .get((base + bit) as usize)
                    .copied()
                    .ok_or_else(|| SynthesisError::BitOutOfRange {
                        signal: name.to_string(),
                        bit: base + bit,
                        width: signal.width,
                    })
            })
            .collect()
    }
}
