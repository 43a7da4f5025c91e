//! Integration tests for register matrix assembly.

use std::collections::HashMap;
use std::time::Duration;

use arvak_results::{
    ExecutionData, QpuResultData, QvmResultData, ReadoutValues, RegisterData,
    RegisterMatrixConversionError, ResultData,
};
use indexmap::IndexMap;
use ndarray::arr2;
use proptest::prelude::*;

fn mappings(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn integer_readout(pairs: &[(&str, Vec<i64>)]) -> HashMap<String, ReadoutValues> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), ReadoutValues::Integer(v.clone())))
        .collect()
}

// ----------------------------------------------------------------------------
// Hardware readout
// ----------------------------------------------------------------------------

#[test]
fn test_rectangular_qpu_data_to_register_map() {
    let data = ResultData::Qpu(QpuResultData::from_mappings_and_values(
        mappings(&[
            ("ro[1]", "qB"),
            ("ro[2]", "qC"),
            ("ro[0]", "qA"),
            ("bar[0]", "qE"),
            ("bar[1]", "qD"),
        ]),
        integer_readout(&[
            ("qA", vec![1, 2]),
            ("qB", vec![3, 4]),
            ("qC", vec![5, 6]),
            ("qD", vec![0, 1]),
            ("qE", vec![2, 3]),
        ]),
        HashMap::new(),
    ));

    let map = data.to_register_map().unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["bar", "ro"]);

    let ro = map.get_register_matrix("ro").unwrap().as_integer().unwrap();
    assert_eq!(ro, &arr2(&[[1, 3, 5], [2, 4, 6]]));

    let bar = map.get_register_matrix("bar").unwrap().as_integer().unwrap();
    assert_eq!(bar, &arr2(&[[2, 0], [3, 1]]));
}

#[test]
fn test_non_contiguous_indices() {
    let data = ResultData::Qpu(QpuResultData::from_mappings_and_values(
        mappings(&[("ro[7]", "q7"), ("ro[2]", "q2")]),
        integer_readout(&[("q2", vec![1, 0, 1]), ("q7", vec![0, 0, 1])]),
        HashMap::new(),
    ));

    let map = data.to_register_map().unwrap();
    let ro = map.get_register_matrix("ro").unwrap();
    assert_eq!(ro.shape(), (3, 2));
    assert_eq!(ro.as_integer().unwrap(), &arr2(&[[1, 0], [0, 0], [1, 1]]));
}

#[test]
fn test_jagged_qpu_data() {
    let data = ResultData::Qpu(QpuResultData::from_mappings_and_values(
        mappings(&[("ro[0]", "qA"), ("ro[1]", "qB")]),
        integer_readout(&[("qA", vec![0, 1, 1]), ("qB", vec![1, 1])]),
        HashMap::new(),
    ));

    assert_eq!(
        data.to_register_map(),
        Err(RegisterMatrixConversionError::JaggedData {
            register: "ro".into()
        })
    );
}

#[test]
fn test_duplicate_index() {
    let data = ResultData::Qpu(QpuResultData::from_mappings_and_values(
        mappings(&[("ro[1]", "qA"), ("ro[01]", "qB")]),
        integer_readout(&[("qA", vec![0]), ("qB", vec![1])]),
        HashMap::new(),
    ));

    assert_eq!(
        data.to_register_map(),
        Err(RegisterMatrixConversionError::DuplicateIndex {
            register: "ro".into(),
            index: 1
        })
    );
}

#[test]
fn test_unmapped_handle() {
    let data = ResultData::Qpu(QpuResultData::from_mappings_and_values(
        mappings(&[("ro[0]", "qA"), ("ro[1]", "qZ")]),
        integer_readout(&[("qA", vec![0])]),
        HashMap::new(),
    ));

    assert_eq!(
        data.to_register_map(),
        Err(RegisterMatrixConversionError::UnmappedHandle {
            memory_reference: "ro[1]".into(),
            handle: "qZ".into()
        })
    );
}

// ----------------------------------------------------------------------------
// Simulator memory
// ----------------------------------------------------------------------------

#[test]
fn test_qvm_data_to_register_map() {
    let data = ResultData::Qvm(QvmResultData::from_memory_map(HashMap::from([
        (
            "ro".to_string(),
            RegisterData::I8(vec![vec![0, 1, 1], vec![1, 0, 1]]),
        ),
        (
            "theta".to_string(),
            RegisterData::F64(vec![vec![0.5], vec![0.25]]),
        ),
    ])));

    let map = data.to_register_map().unwrap();
    assert_eq!(
        map.get_register_matrix("ro").unwrap().as_integer().unwrap(),
        &arr2(&[[0, 1, 1], [1, 0, 1]])
    );
    assert_eq!(
        map.get_register_matrix("theta").unwrap().as_real().unwrap(),
        &arr2(&[[0.5], [0.25]])
    );
    assert!(map.get_register_matrix("missing").is_none());
}

#[test]
fn test_jagged_qvm_data() {
    let data = ResultData::Qvm(QvmResultData::from_memory_map(HashMap::from([(
        "ro".to_string(),
        RegisterData::I16(vec![vec![0, 1], vec![1]]),
    )])));

    assert!(matches!(
        data.to_register_map(),
        Err(RegisterMatrixConversionError::JaggedData { .. })
    ));
}

#[test]
fn test_execution_data_duration() {
    let execution = ExecutionData {
        result_data: ResultData::Qvm(QvmResultData::from_memory_map(HashMap::new())),
        duration: None,
    };
    assert!(execution.result_data.to_register_map().unwrap().is_empty());

    let execution = ExecutionData {
        duration: Some(Duration::from_micros(250)),
        ..execution
    };
    let json = serde_json::to_string(&execution).unwrap();
    let restored: ExecutionData = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, execution);
}

// ----------------------------------------------------------------------------
// Properties
// ----------------------------------------------------------------------------

proptest! {
    /// Column `i` always holds the values of the i-th lowest mapped index,
    /// whatever order the mappings arrive in.
    #[test]
    fn test_columns_follow_index_order(
        indices in prop::collection::btree_set(0_u64..64, 1..8),
        shots in 1_usize..6,
        seed in any::<u64>(),
    ) {
        let mut entries: Vec<u64> = indices.iter().copied().collect();
        // Deterministic shuffle of insertion order.
        let len = entries.len();
        entries.rotate_left((seed % len as u64) as usize);

        let mappings: IndexMap<String, String> = entries
            .iter()
            .map(|i| (format!("ro[{i}]"), format!("q{i}")))
            .collect();
        let readout: HashMap<String, ReadoutValues> = entries
            .iter()
            .map(|&i| {
                let column = (0..shots).map(|s| (i as i64) * 100 + s as i64).collect();
                (format!("q{i}"), ReadoutValues::Integer(column))
            })
            .collect();

        let data = ResultData::Qpu(QpuResultData::from_mappings_and_values(
            mappings,
            readout,
            HashMap::new(),
        ));
        let map = data.to_register_map().unwrap();
        let ro = map.get_register_matrix("ro").unwrap().as_integer().unwrap();

        prop_assert_eq!(ro.dim(), (shots, indices.len()));
        for (column, index) in indices.iter().enumerate() {
            for shot in 0..shots {
                prop_assert_eq!(ro[[shot, column]], (*index as i64) * 100 + shot as i64);
            }
        }
    }
}
