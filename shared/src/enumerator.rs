use log::warn;

use crate::{error::EnumerationError, result_code::ResultCode};

/// Runs the count-then-fill protocol used by every variable-length runtime
/// output.
///
/// The first call passes a capacity of zero and only learns the count. The
/// second passes that count as capacity. The runtime may have changed in
/// between: a smaller count is truncated to, a larger one gets exactly one
/// more fill attempt, after which whatever fits is returned.
#[derive(Clone, Copy, Debug)]
pub struct TwoCallEnumerator {
    label: &'static str,
}

impl TwoCallEnumerator {
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// `count` reports how many items exist. `fill` is given a capacity and
    /// returns `(count_output, items)`.
    pub fn enumerate<T, C, F>(&self, mut count: C, mut fill: F) -> Result<Vec<T>, EnumerationError>
    where
        C: FnMut() -> Result<u32, ResultCode>,
        F: FnMut(u32) -> Result<(u32, Vec<T>), ResultCode>,
    {
        let count = count().map_err(|code| EnumerationError::CountFailed {
            label: self.label,
            code,
        })?;
        self.fill_from(count, &mut fill)
    }

    /// Same protocol over a single runtime call; `call(0)` is the sizing call
    pub fn enumerate_with<T, F>(&self, mut call: F) -> Result<Vec<T>, EnumerationError>
    where
        F: FnMut(u32) -> Result<(u32, Vec<T>), ResultCode>,
    {
        let (count, _) = call(0).map_err(|code| EnumerationError::CountFailed {
            label: self.label,
            code,
        })?;
        self.fill_from(count, &mut call)
    }

    fn fill_from<T, F>(&self, count: u32, fill: &mut F) -> Result<Vec<T>, EnumerationError>
    where
        F: FnMut(u32) -> Result<(u32, Vec<T>), ResultCode>,
    {
        if count == 0 {
            return Ok(Vec::new());
        }

        let (output, mut items) = self.fill_once(count, fill)?;
        if output <= count {
            if output < count {
                warn!(
                    "{}: runtime reported {} items after advertising {}, truncating",
                    self.label, output, count
                );
            }
            items.truncate(output as usize);
            return Ok(items);
        }

        warn!(
            "{}: runtime grew from {} to {} items between calls, retrying once",
            self.label, count, output
        );
        let capacity = output;
        let (retry_output, mut items) = self.fill_once(capacity, fill)?;
        if retry_output != capacity {
            warn!(
                "{}: runtime still inconsistent after retry ({} reported, capacity {}), returning partial result",
                self.label, retry_output, capacity
            );
        }
        items.truncate(retry_output.min(capacity) as usize);
        Ok(items)
    }

    fn fill_once<T, F>(&self, capacity: u32, fill: &mut F) -> Result<(u32, Vec<T>), EnumerationError>
    where
        F: FnMut(u32) -> Result<(u32, Vec<T>), ResultCode>,
    {
        fill(capacity).map_err(|code| EnumerationError::FillFailed {
            label: self.label,
            capacity,
            code,
        })
    }
}
