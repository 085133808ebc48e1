mod test_third_peer_is_turned_away;
