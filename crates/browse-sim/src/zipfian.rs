use rand::Rng;
use rand_distr::Zipf;

/// Zipfian page picker: a handful of hub pages soak up most of the traffic,
/// the long tail of product pages gets the rest — roughly how real shoppers
/// browse a storefront.
pub struct ZipfianPages {
    dist: Zipf<f64>,
}

impl ZipfianPages {
    /// `num_products` is the size of the product long tail.
    pub fn new(num_products: u64, alpha: f64) -> Self {
        // Ranks 1..=4 are the hub pages, the rest map to products
        let dist = Zipf::new(num_products + 4, alpha).expect("invalid Zipfian parameters");
        Self { dist }
    }

    /// Pick the next page path.
    pub fn next_path(&mut self) -> String {
        let rank = rand::thread_rng().sample(&self.dist) as u64;
        match rank {
            0 | 1 => "/".to_string(),
            2 => "/collections/sale".to_string(),
            3 => "/collections/new".to_string(),
            4 => "/pages/about".to_string(),
            n => format!("/products/item-{}", n - 4),
        }
    }
}
