use num::Num;
use serde::de::Error as DeError;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::SparseVec;

impl<N> Serialize for SparseVec<N>
where
    N: Num + Serialize + Copy,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // len と entries (index, value) を順序付きで出力する
        let mut state = serializer.serialize_struct("SparseVec", 2)?;
        state.serialize_field("len", &(self.len as u64))?;
        let entries: Vec<(u64, N)> = self
            .raw_iter()
            .map(|(idx, val)| (idx as u64, *val))
            .collect();
        state.serialize_field("entries", &entries)?;
        state.end()
    }
}

impl<'de, N> Deserialize<'de> for SparseVec<N>
where
    N: Num + Deserialize<'de> + Copy,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct SparseVecData<N> {
            len: u64,
            entries: Vec<(u64, N)>,
        }

        let data = SparseVecData::<N>::deserialize(deserializer)?;
        let len = data.len as usize;
        let mut last: Option<u64> = None;
        for (idx, _) in &data.entries {
            if last.is_some_and(|l| l >= *idx) {
                return Err(DeError::custom("SparseVec entries must be strictly ascending"));
            }
            last = Some(*idx);
        }
        let pairs = data
            .entries
            .into_iter()
            .map(|(idx, val)| (idx as usize, val))
            .collect();
        SparseVec::from_pairs(len, pairs)
            .ok_or_else(|| DeError::custom("SparseVec entry index out of range"))
    }
}
