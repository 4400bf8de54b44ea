/// Read at most `cap` bytes of the response body.
///
/// Anything past the cap is dropped unread; a truncated JSON document then fails to decode
/// instead of being buffered without bound.
pub(crate) async fn read_capped(
    mut resp: reqwest::Response,
    cap: usize,
) -> Result<Vec<u8>, reqwest::Error> {
    let mut body = Vec::with_capacity(
        resp.content_length()
            .map_or(0, |len| usize::try_from(len).unwrap_or(cap).min(cap)),
    );

    while let Some(chunk) = resp.chunk().await? {
        let room = cap - body.len();
        if chunk.len() >= room {
            body.extend_from_slice(&chunk[..room]);
            #[cfg(feature = "tracing")]
            if chunk.len() > room {
                tracing::warn!(cap, "response body exceeds cap; truncated");
            }
            break;
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}
