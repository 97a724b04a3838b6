/// Assert that the client has no request waiting on a completion
#[macro_export]
macro_rules! assert_no_pending_requests {
    ($client:expr) => {
        assert_eq!(
            $client.pending_requests(),
            0,
            "Client should not have any pending requests"
        );
    };
}

/// Assert that the mock runtime issued `operation` exactly `count` times
#[macro_export]
macro_rules! assert_call_count {
    ($client:expr, $operation:expr, $count:expr) => {
        assert_eq!(
            $client.runtime().call_count($operation),
            $count,
            "Expected {} to be called {} times",
            $operation,
            $count
        );
    };
}
