mod test_media_acquisition;
