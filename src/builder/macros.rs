//! Macros for ergonomic table construction.

/// Build a `Vec<Edge>` from a nested `state => { symbol => target }` listing.
///
/// Each identifier is passed through `to_owned()`, so string literals become
/// `String`s while `char`s and enum values are used as they are.
///
/// # Example
///
/// ```
/// use streakfsm::edges;
/// use streakfsm::builder::Edge;
///
/// let edges: Vec<Edge<String, char>> = edges! {
///     "Q0" => { 'S' => "S1", 'L' => "L1" },
///     "S1" => { 'S' => "S1", 'L' => "L1" },
///     "L1" => { 'S' => "S1", 'L' => "L1" },
/// };
///
/// assert_eq!(edges.len(), 6);
/// assert_eq!(edges[1].to, "L1");
/// ```
#[macro_export]
macro_rules! edges {
    (
        $(
            $from:expr => { $( $symbol:expr => $to:expr ),* $(,)? }
        ),* $(,)?
    ) => {
        vec![
            $(
                $(
                    $crate::builder::Edge::new(
                        ($from).to_owned(),
                        ($symbol).to_owned(),
                        ($to).to_owned(),
                    ),
                )*
            )*
        ]
    };
}
