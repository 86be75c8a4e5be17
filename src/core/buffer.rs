use serde::Serialize;

use super::attribute::{AttributeValue, ComponentDataType};
use super::shared::AttributeValueIdx;

/// Flat storage for the values of one attribute.
///
/// Values are kept as raw bytes with the component layout tracked
/// dynamically, the way the compressed form stores them; typed access goes
/// through [`AttributeValue`] implementations. Reads are unaligned, so the
/// buffer never has to care about the alignment of the value type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttributeBuffer {
    data: Vec<u8>,
    component_type: ComponentDataType,
    num_components: usize,
}

impl AttributeBuffer {
    pub fn new(component_type: ComponentDataType, num_components: usize) -> Self {
        Self {
            data: Vec::new(),
            component_type,
            num_components,
        }
    }

    pub fn from_vec<Data: AttributeValue>(values: Vec<Data>) -> Self {
        let mut out = Self::new(Data::COMPONENT_TYPE, Data::NUM_COMPONENTS);
        out.data = bytemuck::cast_slice(&values).to_vec();
        out
    }

    /// Size of one value in bytes.
    #[inline]
    pub fn byte_stride(&self) -> usize {
        self.component_type.size() * self.num_components
    }

    /// The number of values in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        let stride = self.byte_stride();
        if stride == 0 {
            0
        } else {
            self.data.len() / stride
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Grows or shrinks the buffer to `num_values` zero-filled values.
    pub fn resize(&mut self, num_values: usize) {
        self.data.resize(num_values * self.byte_stride(), 0);
    }

    pub fn get<Data: AttributeValue>(&self, val_idx: AttributeValueIdx) -> Data {
        self.check_layout::<Data>();
        let stride = self.byte_stride();
        let at = usize::from(val_idx) * stride;
        bytemuck::pod_read_unaligned(&self.data[at..at + stride])
    }

    pub fn set<Data: AttributeValue>(&mut self, val_idx: AttributeValueIdx, value: Data) {
        self.check_layout::<Data>();
        let stride = self.byte_stride();
        let at = usize::from(val_idx) * stride;
        self.data[at..at + stride].copy_from_slice(bytemuck::bytes_of(&value));
    }

    #[inline]
    pub fn get_component_type(&self) -> ComponentDataType {
        self.component_type
    }

    #[inline]
    pub fn get_num_components(&self) -> usize {
        self.num_components
    }

    #[inline]
    fn check_layout<Data: AttributeValue>(&self) {
        assert_eq!(
            (self.component_type, self.num_components),
            (Data::COMPONENT_TYPE, Data::NUM_COMPONENTS),
            "value type does not match the buffer layout"
        );
    }
}
