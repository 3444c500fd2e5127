use crate::domain::Listing;

/// Listings ordered by price, cheapest first.
///
/// The sort is stable and listings without a price keep their relative
/// order at the end.
pub fn sort_by_price(listings: &[Listing]) -> Vec<Listing> {
    let mut sorted = listings.to_vec();
    sorted.sort_by_key(|listing| (listing.price.is_none(), listing.price));
    sorted
}

/// The cheapest priced listing. Ties go to the one encountered first.
pub fn find_lowest_price(listings: &[Listing], exclude_out_of_stock: bool) -> Option<&Listing> {
    listings
        .iter()
        .filter(|listing| !(exclude_out_of_stock && listing.is_out_of_stock()))
        .filter_map(|listing| listing.price.map(|price| (price, listing)))
        .min_by_key(|(price, _)| *price)
        .map(|(_, listing)| listing)
}
