mod test_unreachable_relay;
mod test_engine_failure;
